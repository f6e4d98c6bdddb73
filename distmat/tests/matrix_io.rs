use distmat::{
    inspect, peek_element_type, Compression, DistanceElement, DistanceMatrix, ElementType,
    Error, FileFormat, MatrixOptions, WriteOptions, STDIO_PATH,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;
use std::process::{Command, Stdio};
use tempfile::TempDir;

fn random_matrix<T: DistanceElement>(n: usize, seed: u64) -> DistanceMatrix<T> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut mat = DistanceMatrix::<T>::new(n).unwrap();
    rng.fill(bytemuck::cast_slice_mut::<T, u8>(mat.as_mut_slice()));
    mat
}

fn roundtrip<T: DistanceElement>(dir: &TempDir, sizes: &[usize]) {
    for &n in sizes {
        let mat = random_matrix::<T>(n, n as u64);
        let path = dir.path().join(format!("{}-{n}.dm", T::ELEMENT_TYPE.name()));
        mat.write(&path, 0).unwrap();

        let loaded = DistanceMatrix::<T>::open(&path).unwrap();
        assert_eq!(loaded.size(), n);
        assert!(loaded == mat, "{} n={n} differs", T::ELEMENT_TYPE);
    }
}

#[test]
fn test_roundtrip_all_types() {
    let dir = TempDir::new().unwrap();
    let sizes = [0, 1, 2, 10, 1000];

    roundtrip::<f32>(&dir, &sizes);
    roundtrip::<f64>(&dir, &sizes);
    roundtrip::<u8>(&dir, &sizes);
    roundtrip::<u16>(&dir, &sizes);
    roundtrip::<u32>(&dir, &sizes);
    roundtrip::<u64>(&dir, &sizes);
    roundtrip::<u128>(&dir, &sizes);
    roundtrip::<i8>(&dir, &sizes);
    roundtrip::<i16>(&dir, &sizes);
    roundtrip::<i32>(&dir, &sizes);
    roundtrip::<i64>(&dir, &sizes);
    roundtrip::<i128>(&dir, &sizes);
}

#[test]
fn test_gzip_roundtrip_is_bit_identical() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("big.dm.gz");

    let mat = random_matrix::<f64>(1000, 42);
    mat.write(&path, 6).unwrap();

    let raw = std::fs::read(&path).unwrap();
    assert_eq!(&raw[..2], &[0x1f, 0x8b]);

    let loaded = DistanceMatrix::<f64>::open(&path).unwrap();
    assert_eq!(
        bytemuck::cast_slice::<f64, u8>(loaded.as_slice()),
        bytemuck::cast_slice::<f64, u8>(mat.as_slice())
    );
}

#[test]
fn test_type_mismatch_leaves_matrix_untouched() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("floats.dm");
    random_matrix::<f32>(20, 7).write(&path, 0).unwrap();

    let mut target = random_matrix::<f64>(5, 8);
    let before = target.try_clone().unwrap();
    let err = target.read(&path).unwrap_err();

    assert!(matches!(
        err,
        Error::MagicMismatch {
            expected: ElementType::F64,
            found: 0
        }
    ));
    assert!(target == before);
    assert_eq!(target.size(), 5);
}

fn encoded<T: DistanceElement>(n: usize) -> Vec<u8> {
    let mut bytes = Vec::new();
    random_matrix::<T>(n, 17)
        .write_to(&mut bytes, &WriteOptions::default())
        .unwrap();
    bytes
}

/// Read every type's file with every type's matrix; returns the mismatch count
macro_rules! cross_read {
    ($($ty:ty),* $(,)?) => {{
        let files: Vec<(ElementType, Vec<u8>)> =
            vec![$((<$ty>::ELEMENT_TYPE, encoded::<$ty>(6))),*];
        let mut mismatches = 0;
        for (written, bytes) in &files {
            $(
                let reader = <$ty>::ELEMENT_TYPE;
                let mut mat = DistanceMatrix::<$ty>::new(3).unwrap();
                let result = mat.read_from(bytes.as_slice(), FileFormat::Compact);
                if *written == reader {
                    assert!(result.is_ok(), "{reader} failed to read its own file");
                    assert_eq!(mat.size(), 6);
                } else {
                    match result {
                        Err(Error::MagicMismatch { expected, found }) => {
                            assert_eq!(expected, reader);
                            assert_eq!(found, written.tag());
                        }
                        other => panic!("{reader} reading {written}: {other:?}"),
                    }
                    assert_eq!(mat.size(), 3);
                    mismatches += 1;
                }
            )*
        }
        mismatches
    }};
}

#[test]
fn test_every_type_pair() {
    let mismatches = cross_read!(f32, f64, u8, u16, u32, u64, u128, i8, i16, i32, i64, i128);
    assert_eq!(mismatches, 12 * 11);
}

const STDIO_CHILD_ENV: &str = "DISTMAT_STDIO_CHILD";

/// Runs only when spawned by `test_dash_is_stdio`: copies stdin to stdout
#[test]
fn stdio_copy_child() {
    if std::env::var_os(STDIO_CHILD_ENV).is_none() {
        return;
    }
    let mut mat = DistanceMatrix::<u16>::new(0).unwrap();
    mat.read(STDIO_PATH).unwrap();
    mat.write(STDIO_PATH, 0).unwrap();
}

#[test]
fn test_dash_is_stdio() {
    let dir = TempDir::new().unwrap();
    let bytes = encoded::<u16>(9);

    let mut child = Command::new(std::env::current_exe().unwrap())
        .args(["--exact", "stdio_copy_child", "--nocapture", "--test-threads=1"])
        .env(STDIO_CHILD_ENV, "1")
        .current_dir(dir.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(&bytes).unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(output.stdout.windows(bytes.len()).any(|w| w == bytes));
    assert!(!dir.path().join(STDIO_PATH).exists());
}

#[test]
fn test_legacy_variant() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("legacy.dm");
    let mat = random_matrix::<i32>(12, 3);

    let options = WriteOptions::default()
        .with_format(FileFormat::Legacy)
        .with_compression(Compression::Best);
    mat.write_with(&path, &options).unwrap();

    let info = inspect(&path).unwrap();
    assert_eq!(info.element_type, ElementType::I32);
    assert_eq!(info.format, FileFormat::Legacy);
    assert_eq!(info.nelem, 12);
    assert!(info.compressed);

    let mut loaded = DistanceMatrix::<i32>::new(0).unwrap();
    assert!(loaded.read(&path).is_err());
    loaded.read_with(&path, FileFormat::Legacy).unwrap();
    assert!(loaded == mat);
}

#[test]
fn test_inspect_compact() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("u16.dm");
    random_matrix::<u16>(33, 1).write(&path, 0).unwrap();

    let info = inspect(&path).unwrap();
    assert_eq!(info.element_type, ElementType::U16);
    assert_eq!(info.format, FileFormat::Compact);
    assert_eq!(info.nelem, 33);
    assert!(!info.compressed);
}

#[test]
fn test_truncated_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("short.dm");
    random_matrix::<u32>(10, 2).write(&path, 0).unwrap();

    let raw = std::fs::read(&path).unwrap();
    std::fs::write(&path, &raw[..raw.len() - 3]).unwrap();

    let err = DistanceMatrix::<u32>::open(&path).unwrap_err();
    assert!(matches!(err, Error::MalformedFile(_)));
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = DistanceMatrix::<u8>::open(dir.path().join("absent.dm")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_symmetry_and_diagonal() {
    let mut mat = DistanceMatrix::<f32>::with_default(50, -1.0).unwrap();
    for i in 0..50 {
        for j in (i + 1)..50 {
            mat.set(j, i, (i * 100 + j) as f32).unwrap();
        }
    }
    for i in 0..50 {
        assert_eq!(mat.get(i, i), -1.0);
        for j in (i + 1)..50 {
            assert_eq!(mat.get(i, j), mat.get(j, i));
            assert_eq!(mat[(i, j)], (i * 100 + j) as f32);
        }
    }
}

#[test]
fn test_peek_element_type() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("i8.dm.gz");
    random_matrix::<i8>(6, 4).write(&path, 3).unwrap();
    assert_eq!(peek_element_type(&path).unwrap(), ElementType::I8);
}

#[test]
fn test_text_scenario() {
    let mut mat = DistanceMatrix::<u8>::new(4).unwrap();
    let mut value = 1;
    for i in 0..4 {
        for j in (i + 1)..4 {
            mat.set(i, j, value).unwrap();
            value += 1;
        }
    }
    assert_eq!(
        mat.to_string(),
        "0\t1\t2\t3\n1\t0\t4\t5\n2\t4\t0\t6\n3\t5\t6\t0\n"
    );
}

#[test]
fn test_resize_policy() {
    let mut mat = random_matrix::<u64>(10, 5);
    let before = mat.try_clone().unwrap();

    mat.resize(10).unwrap();
    assert!(mat == before);

    assert!(matches!(mat.resize(4), Err(Error::NotImplemented(_))));
    assert_eq!(mat.size(), 10);

    mat.resize(20).unwrap();
    assert_eq!(mat.size(), 20);
    assert_eq!(mat.num_entries(), 190);
    assert!(mat.as_slice().iter().all(|&v| v == u64::INVALID));
}

#[cfg(feature = "mmap")]
mod mmap {
    use super::*;

    #[test]
    fn test_mmap_backed_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("source.dm.gz");
        let mat = random_matrix::<i16>(200, 11);
        mat.write(&path, 1).unwrap();

        let backing = dir.path().join("backing.bin");
        let loaded = DistanceMatrix::<i16>::open_with_options(
            &path,
            0,
            &MatrixOptions::mmap_at(&backing),
            FileFormat::Compact,
        )
        .unwrap();

        assert!(loaded.is_memory_mapped());
        assert_eq!(loaded.backing_path(), Some(backing.as_path()));
        assert!(loaded == mat);

        loaded.close().unwrap();
        let bytes = std::fs::metadata(&backing).unwrap().len();
        assert_eq!(bytes, (200 * 199 / 2 * 2) as u64);
    }

    #[test]
    fn test_write_over_own_backing_file() {
        let dir = TempDir::new().unwrap();
        let backing = dir.path().join("self.bin");
        let mut mat =
            DistanceMatrix::<u32>::with_options(30, 0, &MatrixOptions::mmap_at(&backing)).unwrap();
        mat.fill(5);

        let err = mat.write(&backing, 0).unwrap_err();
        assert!(matches!(err, Error::Io(ref e) if e.kind() == std::io::ErrorKind::InvalidInput));

        let aliased = dir.path().join(".").join("self.bin");
        assert!(mat.write(&aliased, 0).is_err());

        assert_eq!(std::fs::metadata(&backing).unwrap().len(), (30 * 29 / 2 * 4) as u64);
        assert!(mat.as_slice().iter().all(|&v| v == 5));

        let copy = dir.path().join("copy.dm");
        mat.write(&copy, 0).unwrap();
        assert!(DistanceMatrix::<u32>::open(&copy).unwrap() == mat);
    }

    #[test]
    fn test_temporary_backing_removed() {
        let mut mat = DistanceMatrix::<f32>::with_options(64, 0.0, &MatrixOptions::mmap()).unwrap();
        mat.set(1, 2, 3.5).unwrap();
        let path = mat.backing_path().unwrap().to_path_buf();
        assert!(path.exists());

        drop(mat);
        assert!(!path.exists());
    }

    #[test]
    fn test_row_spans_match_heap() {
        let heap = random_matrix::<u32>(40, 9);
        let mut mapped =
            DistanceMatrix::<u32>::with_options(40, 0, &MatrixOptions::mmap()).unwrap();
        mapped.as_mut_slice().copy_from_slice(heap.as_slice());

        assert!(mapped == heap);
        for ((row, a), (_, b)) in heap.row_spans().zip(mapped.row_spans()) {
            assert_eq!(a.len(), 40 - row - 1);
            assert_eq!(a, b);
            for (k, &v) in a.iter().enumerate() {
                assert_eq!(v, heap.get(row, row + 1 + k));
            }
        }
    }

    #[test]
    fn test_mmap_growth() {
        let mut mat = DistanceMatrix::<u8>::with_options(5, 0, &MatrixOptions::mmap()).unwrap();
        mat.fill(9);
        mat.resize(12).unwrap();
        assert_eq!(mat.num_entries(), 66);
        assert!(mat.as_slice().iter().all(|&v| v == u8::MAX));
        mat.close().unwrap();
    }
}
