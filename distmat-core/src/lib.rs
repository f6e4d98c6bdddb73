#![no_std]

//! distmat-core - Packed-Triangle Distance Matrix Definitions
//!
//! This crate provides the pure pieces of the distance matrix engine: the
//! packed upper-triangle index arithmetic, the element type registry, the
//! on-disk header layouts and the storage capability trait. Nothing here
//! performs I/O.

pub mod error;
pub mod format;
pub mod index;
pub mod traits;
pub mod validation;

pub use error::*;
pub use format::*;
pub use traits::*;
pub use validation::*;
