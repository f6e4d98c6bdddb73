//! Binary format definitions for distance matrix files
//!
//! This module contains pure data structure definitions for the on-disk
//! layout. No I/O operations - only format specifications.

pub mod constants;
pub mod element_type;
pub mod header;

// Re-export format definitions
pub use element_type::ElementType;
pub use header::{FileHeader, LegacyHeader};
