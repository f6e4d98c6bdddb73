//! Error types for distmat-core operations

/// Errors that can occur while mapping indices or decoding headers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistmatError {
    /// Row or column is not below the matrix size
    IndexOutOfRange { index: usize, size: usize },
    /// Row and column are equal; the diagonal has no storage slot
    DiagonalAccess { index: usize },
    /// Header tag belongs to a different element type
    MagicMismatch { expected: u8, found: u8 },
    /// Header tag is not in the registry
    UnknownTag(u8),
    /// Header is truncated or otherwise unreadable
    MalformedHeader,
    /// Entry or byte count does not fit in usize
    SizeOverflow,
}

impl core::fmt::Display for DistmatError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DistmatError::IndexOutOfRange { index, size } => {
                write!(f, "Index {index} out of range for matrix of size {size}")
            }
            DistmatError::DiagonalAccess { index } => {
                write!(f, "Diagonal element ({index}, {index}) has no storage slot")
            }
            DistmatError::MagicMismatch { expected, found } => {
                write!(f, "Type tag mismatch: expected {expected}, found {found}")
            }
            DistmatError::UnknownTag(tag) => write!(f, "Unknown type tag {tag}"),
            DistmatError::MalformedHeader => write!(f, "Malformed distance matrix header"),
            DistmatError::SizeOverflow => write!(f, "Matrix size overflows usize"),
        }
    }
}

/// Result type for distmat-core operations
pub type Result<T> = core::result::Result<T, DistmatError>;
