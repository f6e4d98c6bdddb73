//! Storage backends for packed distance matrix entries
//!
//! Two allocation strategies sit behind the [`StorageBackend`] capability:
//! a heap `Vec` and a memory-mapped file. [`Storage`] picks one at runtime
//! from [`MatrixOptions`] so the matrix type carries no backend parameter.

pub mod heap;
#[cfg(feature = "mmap")]
pub mod mmap;

pub use heap::HeapStorage;
#[cfg(feature = "mmap")]
pub use mmap::MmapStorage;

use crate::config::{Backend, MatrixOptions};
use crate::error::Result;
use distmat_core::{DistanceElement, StorageBackend};
use std::path::Path;

/// Runtime-selected storage backend
#[derive(Debug)]
pub enum Storage<T: DistanceElement> {
    Heap(HeapStorage<T>),
    #[cfg(feature = "mmap")]
    Mmap(MmapStorage<T>),
}

impl<T: DistanceElement> Storage<T> {
    /// Allocate `count` sentinel-filled elements as configured by `options`
    pub fn allocate(count: usize, options: &MatrixOptions) -> Result<Self> {
        match &options.backend {
            Backend::Heap => Ok(Storage::Heap(HeapStorage::allocate(count)?)),
            #[cfg(feature = "mmap")]
            Backend::Mmap { path: Some(path) } => Ok(Storage::Mmap(MmapStorage::create(
                path,
                count,
                options.delete_on_drop(),
            )?)),
            #[cfg(feature = "mmap")]
            Backend::Mmap { path: None } => Ok(Storage::Mmap(MmapStorage::temporary(
                count,
                options.delete_on_drop(),
            )?)),
        }
    }

    /// Whether the entries live in a memory-mapped file
    pub fn is_memory_mapped(&self) -> bool {
        match self {
            Storage::Heap(_) => false,
            #[cfg(feature = "mmap")]
            Storage::Mmap(_) => true,
        }
    }

    /// Path of the backing file, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            Storage::Heap(_) => None,
            #[cfg(feature = "mmap")]
            Storage::Mmap(m) => Some(m.path()),
        }
    }

    /// Deep copy into the same kind of backend
    ///
    /// A file-backed buffer is copied into a new temporary file, since two
    /// storages never share one backing file.
    pub fn try_clone(&self) -> Result<Self> {
        let mut copy = match self {
            Storage::Heap(_) => Storage::Heap(HeapStorage::allocate(self.len())?),
            #[cfg(feature = "mmap")]
            Storage::Mmap(_) => Storage::Mmap(MmapStorage::temporary(self.len(), true)?),
        };
        copy.as_mut_slice().copy_from_slice(self.as_slice());
        Ok(copy)
    }

    /// Write dirty pages of a file-backed buffer back to disk
    pub fn flush(&self) -> Result<()> {
        match self {
            Storage::Heap(_) => Ok(()),
            #[cfg(feature = "mmap")]
            Storage::Mmap(m) => m.flush(),
        }
    }

    /// Release the buffer, reporting cleanup failures instead of logging them
    pub fn close(self) -> Result<()> {
        match self {
            Storage::Heap(_) => Ok(()),
            #[cfg(feature = "mmap")]
            Storage::Mmap(m) => m.close(),
        }
    }
}

impl<T: DistanceElement> StorageBackend for Storage<T> {
    type Element = T;
    type Error = crate::error::Error;

    fn as_slice(&self) -> &[T] {
        match self {
            Storage::Heap(h) => h.as_slice(),
            #[cfg(feature = "mmap")]
            Storage::Mmap(m) => m.as_slice(),
        }
    }

    fn as_mut_slice(&mut self) -> &mut [T] {
        match self {
            Storage::Heap(h) => h.as_mut_slice(),
            #[cfg(feature = "mmap")]
            Storage::Mmap(m) => m.as_mut_slice(),
        }
    }

    fn reallocate(&mut self, len: usize) -> Result<()> {
        match self {
            Storage::Heap(h) => h.reallocate(len),
            #[cfg(feature = "mmap")]
            Storage::Mmap(m) => m.reallocate(len),
        }
    }
}
