//! Abstract interfaces for the distance matrix engine
//!
//! Traits are pure interfaces - concrete storage lives in the `distmat` crate.

pub mod backend;
pub mod element;

pub use backend::StorageBackend;
pub use element::DistanceElement;
