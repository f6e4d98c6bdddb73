//! Heap storage backend

use crate::error::{Error, Result};
use distmat_core::{DistanceElement, StorageBackend};
use tracing::debug;

/// Packed entries held in a single process-local allocation
#[derive(Debug, Clone, PartialEq)]
pub struct HeapStorage<T> {
    data: Vec<T>,
}

impl<T: DistanceElement> HeapStorage<T> {
    /// Allocate `count` elements set to the invalid sentinel
    pub fn allocate(count: usize) -> Result<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(count)
            .map_err(|e| Error::Allocation(format!("{count} x {}: {e}", T::ELEMENT_TYPE)))?;
        data.resize(count, T::INVALID);
        debug!(count, element_type = %T::ELEMENT_TYPE, "allocated heap storage");
        Ok(Self { data })
    }

    /// Take ownership of an existing packed buffer
    pub fn from_vec(data: Vec<T>) -> Self {
        Self { data }
    }

    /// Release the packed buffer
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

impl<T: DistanceElement> StorageBackend for HeapStorage<T> {
    type Element = T;
    type Error = Error;

    fn as_slice(&self) -> &[T] {
        &self.data
    }

    fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    fn reallocate(&mut self, len: usize) -> Result<()> {
        // Build the replacement first so a failed allocation leaves us intact
        *self = Self::allocate(len)?;
        Ok(())
    }
}
