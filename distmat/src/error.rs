//! Error type for distance matrix storage and I/O

use distmat_core::{DistmatError, ElementType};
use thiserror::Error;

/// Errors raised by [`DistanceMatrix`](crate::DistanceMatrix) operations
#[derive(Debug, Error)]
pub enum Error {
    /// Backing storage could not be obtained
    #[error("allocation failed: {0}")]
    Allocation(String),

    /// File was written for a different element type or header variant
    #[error("magic mismatch: expected {expected}, found tag {found}")]
    MagicMismatch { expected: ElementType, found: u8 },

    /// File is truncated or its header cannot be decoded
    #[error("malformed file: {0}")]
    MalformedFile(&'static str),

    /// Operation is deliberately unsupported
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    /// Row or column is not below the matrix size
    #[error("index ({row}, {col}) out of range for matrix of size {size}")]
    IndexOutOfRange { row: usize, col: usize, size: usize },

    /// The diagonal is not stored and cannot be written through `set`
    #[error("cannot write diagonal element ({index}, {index}); use set_default_value")]
    InvalidDiagonalWrite { index: usize },

    /// Number of labels passed to text rendering does not match the size
    #[error("expected {expected} labels, found {found}")]
    LabelCountMismatch { expected: usize, found: usize },

    /// Underlying read, write, open or resize failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Convert a core error raised while decoding a header
    pub(crate) fn from_header(err: DistmatError, expected: ElementType) -> Self {
        match err {
            DistmatError::MagicMismatch { found, .. } => Error::MagicMismatch { expected, found },
            DistmatError::UnknownTag(found) => Error::MagicMismatch { expected, found },
            DistmatError::SizeOverflow => Error::MalformedFile("item count overflows usize"),
            DistmatError::MalformedHeader => Error::MalformedFile("header truncated"),
            DistmatError::IndexOutOfRange { .. } | DistmatError::DiagonalAccess { .. } => {
                Error::MalformedFile("invalid header")
            }
        }
    }

    /// Convert a core error raised by checked indexing
    pub(crate) fn from_index(err: DistmatError, row: usize, col: usize, size: usize) -> Self {
        match err {
            DistmatError::DiagonalAccess { index } => Error::InvalidDiagonalWrite { index },
            _ => Error::IndexOutOfRange { row, col, size },
        }
    }
}

/// Result type for distance matrix operations
pub type Result<T> = std::result::Result<T, Error>;
