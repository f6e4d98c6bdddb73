//! distmat - Packed-Triangle Distance Matrix Engine
//!
//! This library stores symmetric pairwise distance matrices as a packed
//! upper triangle, backed by either the heap or a memory-mapped file, and
//! reads and writes them in a compact binary format with optional gzip
//! compression.
//!
//! ## Architecture
//!
//! - **distmat-core**: Index arithmetic, element type registry, header layouts (no I/O)
//! - **distmat**: Storage backends, the matrix engine, binary and text I/O
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use distmat::{DistanceMatrix, MatrixOptions};
//!
//! fn example() -> distmat::Result<()> {
//!     let mut matrix = DistanceMatrix::<f32>::with_options(1000, 0.0, &MatrixOptions::mmap())?;
//!     matrix.set(3, 7, 0.25)?;
//!     assert_eq!(matrix.get(7, 3), 0.25);
//!
//!     matrix.write("distances.dm.gz", 6)?;
//!     let loaded = DistanceMatrix::<f32>::open("distances.dm.gz")?;
//!     assert!(loaded == matrix);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **mmap** (default): File-backed storage through `memmap2`
//! - **serde**: Serialize the element type registry and configuration enums

pub use distmat_core::{
    // Core traits
    DistanceElement, StorageBackend,
    // Format definitions
    ElementType, FileHeader, LegacyHeader,
    // Error handling
    DistmatError,
};
pub use distmat_core::index;

pub mod config;
pub mod error;
pub mod io;
pub mod matrix;
pub mod storage;
pub mod text;

pub use config::{Backend, Compression, FileFormat, MatrixOptions, TextOptions, WriteOptions};
pub use error::{Error, Result};
pub use io::{inspect, peek_element_type, FileInfo, STDIO_PATH};
pub use matrix::{DistanceMatrix, RowSpans};
#[cfg(feature = "mmap")]
pub use storage::mmap::MmapStorage;
pub use storage::{heap::HeapStorage, Storage};
pub use text::NAMES_HEADER;
