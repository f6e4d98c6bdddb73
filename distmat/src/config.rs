//! Configuration for matrix construction, serialization and rendering

#[cfg(feature = "mmap")]
use std::path::{Path, PathBuf};

/// Where the packed entries of a matrix live
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Backend {
    /// Process-local heap allocation
    #[default]
    Heap,
    /// Memory-mapped file; `None` maps an anonymous temporary file
    #[cfg(feature = "mmap")]
    Mmap { path: Option<PathBuf> },
}

/// Options for constructing a [`DistanceMatrix`](crate::DistanceMatrix)
#[derive(Debug, Clone, Default)]
pub struct MatrixOptions {
    /// Storage strategy
    pub backend: Backend,
    /// Remove the backing file on drop; `None` picks the backend default
    pub delete_on_drop: Option<bool>,
}

impl MatrixOptions {
    /// Heap-backed storage
    pub fn heap() -> Self {
        Self::default()
    }

    /// Storage mapped from an anonymous temporary file
    #[cfg(feature = "mmap")]
    pub fn mmap() -> Self {
        Self {
            backend: Backend::Mmap { path: None },
            delete_on_drop: None,
        }
    }

    /// Storage mapped from the file at `path`, created if missing
    #[cfg(feature = "mmap")]
    pub fn mmap_at<P: AsRef<Path>>(path: P) -> Self {
        Self {
            backend: Backend::Mmap {
                path: Some(path.as_ref().to_path_buf()),
            },
            delete_on_drop: None,
        }
    }

    /// Set whether the backing file is removed on drop
    pub fn with_delete_on_drop(mut self, delete: bool) -> Self {
        self.delete_on_drop = Some(delete);
        self
    }

    /// Resolved delete-on-drop policy
    ///
    /// Temporary files are removed by default, caller-named files are kept.
    pub fn delete_on_drop(&self) -> bool {
        match &self.backend {
            Backend::Heap => false,
            #[cfg(feature = "mmap")]
            Backend::Mmap { path } => self.delete_on_drop.unwrap_or(path.is_none()),
        }
    }
}

/// Gzip compression applied when writing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Compression {
    /// Write the raw format
    #[default]
    None,
    /// Gzip at level 1-9
    Level(u32),
    /// Gzip at the strongest level
    Best,
}

impl Compression {
    /// Map a numeric level: 0 disables compression, levels above 9 clamp to 9
    pub fn from_level(level: u32) -> Self {
        match level {
            0 => Compression::None,
            1..=8 => Compression::Level(level),
            _ => Compression::Best,
        }
    }

    /// Gzip level, or `None` when writing uncompressed
    pub fn level(self) -> Option<u32> {
        match self {
            Compression::None => None,
            Compression::Level(0) => None,
            Compression::Level(level) => Some(level.min(9)),
            Compression::Best => Some(9),
        }
    }
}

impl From<u32> for Compression {
    fn from(level: u32) -> Self {
        Compression::from_level(level)
    }
}

/// Header variant of a matrix file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FileFormat {
    /// One tag byte, then the count (authoritative)
    #[default]
    Compact,
    /// Newline-terminated type name, then the count
    Legacy,
}

/// Options for writing a matrix file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WriteOptions {
    pub compression: Compression,
    pub format: FileFormat,
}

impl WriteOptions {
    /// Set compression
    pub fn with_compression<C: Into<Compression>>(mut self, compression: C) -> Self {
        self.compression = compression.into();
        self
    }

    /// Set the header variant
    pub fn with_format(mut self, format: FileFormat) -> Self {
        self.format = format;
        self
    }
}

/// Options for rendering a matrix as text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextOptions {
    /// Emit values in scientific notation
    pub scientific: bool,
    /// One label per item; adds a `#Names` header row and a label column
    pub labels: Option<Vec<String>>,
}

impl TextOptions {
    /// Set scientific notation
    pub fn with_scientific(mut self, scientific: bool) -> Self {
        self.scientific = scientific;
        self
    }

    /// Set item labels
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }
}
