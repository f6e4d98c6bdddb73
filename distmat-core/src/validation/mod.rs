//! Pure validation utilities
//!
//! Overflow-checked size arithmetic for headers read from untrusted input.

pub mod bounds;

pub use bounds::{byte_size, entry_count, payload_size};
