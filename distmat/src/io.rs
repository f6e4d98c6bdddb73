//! Binary persistence for distance matrices
//!
//! Files consist of a header (compact tag byte or legacy type name), the
//! item count as a native-endian u64, and the packed entries in row-major
//! upper-triangle order. The whole stream may be gzip-compressed; readers
//! detect compression from the gzip magic bytes. A path of `-` means
//! standard input for reads and standard output for writes.

use crate::config::{FileFormat, MatrixOptions, WriteOptions};
use crate::error::{Error, Result};
use crate::matrix::DistanceMatrix;
use distmat_core::constants::{GZIP_MAGIC, LEGACY_TERMINATOR, MAX_LEGACY_NAME_LEN};
use distmat_core::{payload_size, DistanceElement, ElementType, FileHeader, LegacyHeader};
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    path::Path,
};
use tracing::debug;

/// Path that stands for standard input or output
pub const STDIO_PATH: &str = "-";

/// Upper bound on the payload buffered ahead of the bytes read so far
const DECODE_CHUNK_BYTES: usize = 1 << 20;

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == STDIO_PATH
}

/// Open `path` for reading, honouring the `-` convention
fn open_input(path: &Path) -> Result<Box<dyn Read>> {
    if is_stdio(path) {
        Ok(Box::new(io::stdin().lock()))
    } else {
        Ok(Box::new(File::open(path)?))
    }
}

/// Map a short read onto a malformed-file error
fn read_exact_or<R: Read>(reader: &mut R, buf: &mut [u8], what: &'static str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => Error::MalformedFile(what),
        _ => Error::Io(e),
    })
}

/// Read until `buf` is full or the input ends; returns the bytes read
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Wrap `reader` in a gzip decoder when its stream starts with the gzip magic
fn decompressing<'a, R: Read + 'a>(mut reader: R) -> Result<(Box<dyn Read + 'a>, bool)> {
    let mut magic = [0u8; 2];
    let got = read_up_to(&mut reader, &mut magic)?;
    let stream = io::Cursor::new(magic).take(got as u64).chain(reader);

    if got == GZIP_MAGIC.len() && magic == GZIP_MAGIC {
        Ok((Box::new(MultiGzDecoder::new(stream)), true))
    } else {
        Ok((Box::new(BufReader::new(stream)), false))
    }
}

/// Read a legacy name line, terminator consumed and excluded
fn read_name_line<R: Read>(reader: &mut R, first: Option<u8>) -> Result<Vec<u8>> {
    let mut line: Vec<u8> = first.into_iter().collect();
    let mut byte = [0u8; 1];
    while line.last() != Some(&LEGACY_TERMINATOR) && line.len() <= MAX_LEGACY_NAME_LEN {
        if read_up_to(reader, &mut byte)? == 0 {
            break;
        }
        line.push(byte[0]);
    }
    Ok(line)
}

fn read_count<R: Read>(reader: &mut R) -> Result<u64> {
    let mut count = [0u8; 8];
    read_exact_or(reader, &mut count, "item count truncated")?;
    Ok(u64::from_ne_bytes(count))
}

/// Decode a whole matrix stream into its item count and packed entries
fn decode<T: DistanceElement, R: Read>(reader: &mut R, format: FileFormat) -> Result<(usize, Vec<T>)> {
    let expected = T::ELEMENT_TYPE;

    let nelem = match format {
        FileFormat::Compact => {
            let mut bytes = [0u8; FileHeader::SIZE];
            read_exact_or(reader, &mut bytes, "header truncated")?;
            let header =
                FileHeader::from_bytes(&bytes).map_err(|e| Error::from_header(e, expected))?;
            header.expect(expected).map_err(|e| Error::from_header(e, expected))?;
            header.nelem
        }
        FileFormat::Legacy => {
            let line = read_name_line(reader, None)?;
            let len = LegacyHeader::name_len(&line, expected)
                .map_err(|e| Error::from_header(e, expected))?;
            LegacyHeader::expect(&line[..len], expected)
                .map_err(|e| Error::from_header(e, expected))?;
            read_count(reader)?
        }
    };

    let (count, bytes) = payload_size::<T>(nelem).map_err(|e| Error::from_header(e, expected))?;

    // Grow with the bytes actually present, not with the count the header claims
    let chunk = (DECODE_CHUNK_BYTES / std::mem::size_of::<T>()).max(1);
    let mut entries: Vec<T> = Vec::new();
    while entries.len() < count {
        let filled = entries.len();
        let next = count.min(filled + chunk);
        entries
            .try_reserve(next - filled)
            .map_err(|e| Error::Allocation(format!("{count} x {expected}: {e}")))?;
        entries.resize(next, T::INVALID);
        read_exact_or(
            reader,
            bytemuck::cast_slice_mut(&mut entries[filled..]),
            "entries truncated",
        )?;
    }

    debug!(nelem, count, bytes, element_type = %expected, "decoded distance matrix");
    // payload_size already proved nelem fits in usize
    Ok((nelem as usize, entries))
}

/// Summary of a matrix file's header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileInfo {
    pub element_type: ElementType,
    pub format: FileFormat,
    pub nelem: u64,
    pub compressed: bool,
}

/// Read only the header of the file at `path`
///
/// Lets a caller that does not know the element type in advance pick the
/// right `DistanceMatrix<T>` to read the file with.
pub fn inspect<P: AsRef<Path>>(path: P) -> Result<FileInfo> {
    let (mut reader, compressed) = decompressing(open_input(path.as_ref())?)?;

    let mut first = [0u8; 1];
    read_exact_or(&mut reader, &mut first, "header truncated")?;

    let (element_type, format) = match ElementType::from_tag(first[0]) {
        Some(ty) => (ty, FileFormat::Compact),
        None => {
            let line = read_name_line(&mut reader, Some(first[0]))?;
            let name = line
                .strip_suffix(&[LEGACY_TERMINATOR])
                .ok_or(Error::MalformedFile("unrecognized header"))?;
            let ty = ElementType::from_name(name)
                .ok_or(Error::MalformedFile("unrecognized header"))?;
            (ty, FileFormat::Legacy)
        }
    };

    Ok(FileInfo {
        element_type,
        format,
        nelem: read_count(&mut reader)?,
        compressed,
    })
}

/// Element type named by the header of the file at `path`
pub fn peek_element_type<P: AsRef<Path>>(path: P) -> Result<ElementType> {
    Ok(inspect(path)?.element_type)
}

impl<T: DistanceElement> DistanceMatrix<T> {
    /// Construct a heap-backed matrix from the compact file at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, T::ZERO, &MatrixOptions::heap(), FileFormat::Compact)
    }

    /// Construct a matrix from a file using the configured backend
    ///
    /// `options` must not name the file being read as its backing file.
    pub fn open_with_options<P: AsRef<Path>>(
        path: P,
        default_value: T,
        options: &MatrixOptions,
        format: FileFormat,
    ) -> Result<Self> {
        let mut mat = Self::with_options(0, default_value, options)?;
        mat.read_with(path, format)?;
        Ok(mat)
    }

    /// Replace the contents with the compact file at `path`
    pub fn read<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.read_with(path, FileFormat::Compact)
    }

    /// Replace the contents with the file at `path` in the given header variant
    ///
    /// Nothing is modified unless the whole file decodes; a header for another
    /// element type or variant fails with [`Error::MagicMismatch`].
    pub fn read_with<P: AsRef<Path>>(&mut self, path: P, format: FileFormat) -> Result<()> {
        let path = path.as_ref();
        debug!(path = %path.display(), ?format, "reading distance matrix");
        self.read_from(open_input(path)?, format)
    }

    /// Replace the contents with a matrix stream, compressed or not
    pub fn read_from<R: Read>(&mut self, reader: R, format: FileFormat) -> Result<()> {
        let (mut reader, _) = decompressing(reader)?;
        let (nelem, entries) = decode::<T, _>(&mut reader, format)?;
        self.replace_entries(nelem, &entries)
    }

    /// Write to `path` in the compact format
    ///
    /// `level` 0 writes uncompressed, 1-9 select the gzip level and larger
    /// values use the strongest level.
    pub fn write<P: AsRef<Path>>(&self, path: P, level: u32) -> Result<()> {
        self.write_with(path, &WriteOptions::default().with_compression(level))
    }

    /// Write to `path` with explicit options
    ///
    /// Writing over the backing file of this same memory-mapped matrix
    /// fails with an [`io::ErrorKind::InvalidInput`] error before the file
    /// is touched.
    pub fn write_with<P: AsRef<Path>>(&self, path: P, options: &WriteOptions) -> Result<()> {
        let path = path.as_ref();
        if self.is_backed_by(path) {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is the backing file of this matrix", path.display()),
            )));
        }
        debug!(
            path = %path.display(),
            nelem = self.size(),
            compression = ?options.compression,
            format = ?options.format,
            "writing distance matrix"
        );

        if is_stdio(path) {
            self.write_to(io::stdout().lock(), options)
        } else {
            self.write_to(File::create(path)?, options)
        }
    }

    fn is_backed_by(&self, path: &Path) -> bool {
        let Some(backing) = self.backing_path() else {
            return false;
        };
        if backing == path {
            return true;
        }
        match (std::fs::canonicalize(backing), std::fs::canonicalize(path)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    /// Write a matrix stream to `writer`
    pub fn write_to<W: Write>(&self, writer: W, options: &WriteOptions) -> Result<()> {
        match options.compression.level() {
            Some(level) => {
                let mut encoder = GzEncoder::new(
                    BufWriter::new(writer),
                    flate2::Compression::new(level),
                );
                self.encode(&mut encoder, options.format)?;
                encoder.finish()?.flush()?;
            }
            None => {
                let mut writer = BufWriter::new(writer);
                self.encode(&mut writer, options.format)?;
                writer.flush()?;
            }
        }
        Ok(())
    }

    fn encode<W: Write>(&self, writer: &mut W, format: FileFormat) -> Result<()> {
        let nelem = self.size() as u64;
        match format {
            FileFormat::Compact => {
                writer.write_all(&FileHeader::new(T::ELEMENT_TYPE, nelem).to_bytes_array())?;
            }
            FileFormat::Legacy => {
                writer.write_all(LegacyHeader::name_line(T::ELEMENT_TYPE))?;
                writer.write_all(&[LEGACY_TERMINATOR])?;
                writer.write_all(&nelem.to_ne_bytes())?;
            }
        }
        writer.write_all(bytemuck::cast_slice(self.as_slice()))?;
        Ok(())
    }
}
