//! Memory-mapped file storage backend
//!
//! The packed entries live in a file that is resized to exactly
//! `count * size_of::<T>()` bytes and mapped read/write. The mapping is
//! page aligned, which satisfies the alignment of every element type.

use crate::error::{Error, Result};
use distmat_core::{byte_size, DistanceElement, StorageBackend};
use memmap2::{MmapMut, MmapOptions};
use std::{
    fs::{File, OpenOptions},
    marker::PhantomData,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

/// Packed entries held in a memory-mapped file
pub struct MmapStorage<T> {
    file: File,
    path: PathBuf,
    // None when the buffer is empty; zero-length mappings are not portable
    map: Option<MmapMut>,
    delete_on_drop: bool,
    _phantom: PhantomData<T>,
}

impl<T: DistanceElement> MmapStorage<T> {
    /// Map `count` elements from the file at `path`, creating it if missing
    ///
    /// Existing contents are overwritten with the invalid sentinel.
    pub fn create<P: AsRef<Path>>(path: P, count: usize, delete_on_drop: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        Self::from_file(file, path, count, delete_on_drop)
    }

    /// Map `count` elements from a fresh temporary file
    pub fn temporary(count: usize, delete_on_drop: bool) -> Result<Self> {
        let (file, path) = tempfile::Builder::new()
            .prefix("distmat-")
            .suffix(".bin")
            .tempfile()
            .map_err(|e| Error::Allocation(format!("temporary file: {e}")))?
            .keep()
            .map_err(|e| Error::Allocation(format!("temporary file: {e}")))?;

        Self::from_file(file, path, count, delete_on_drop)
    }

    fn from_file(file: File, path: PathBuf, count: usize, delete_on_drop: bool) -> Result<Self> {
        let mut storage = Self {
            file,
            path,
            map: None,
            delete_on_drop,
            _phantom: PhantomData,
        };
        storage.remap(count)?;
        Ok(storage)
    }

    /// Resize the backing file to `count` elements, map it and fill the sentinel
    ///
    /// On failure the previous mapping is restored when possible, so the
    /// storage keeps its old length and contents.
    fn remap(&mut self, count: usize) -> Result<()> {
        let bytes = byte_size::<T>(count)
            .map_err(|e| Error::Allocation(format!("{count} x {}: {e}", T::ELEMENT_TYPE)))?;
        let old_bytes = self.map.as_ref().map_or(0, |m| m.len());

        // Unmap before truncating or extending the file
        self.map = None;

        if let Err(e) = self.map_bytes(bytes) {
            if let Err(restore) = self.map_bytes(old_bytes) {
                warn!(
                    path = %self.path.display(),
                    error = %restore,
                    "failed to restore previous mapping"
                );
            }
            return Err(Error::Allocation(format!(
                "map {} bytes of {}: {e}",
                bytes,
                self.path.display()
            )));
        }

        self.as_mut_slice().fill(T::INVALID);
        debug!(
            count,
            bytes,
            element_type = %T::ELEMENT_TYPE,
            path = %self.path.display(),
            "mapped file storage"
        );
        Ok(())
    }

    fn map_bytes(&mut self, bytes: usize) -> std::io::Result<()> {
        self.map = None;
        self.file.set_len(bytes as u64)?;
        if bytes > 0 {
            // SAFETY: The file is opened read/write and is exclusively owned by
            // this storage. Its length was just set to `bytes`, so the mapping
            // covers valid file data for its whole lifetime.
            let map = unsafe { MmapOptions::new().len(bytes).map_mut(&self.file)? };
            self.map = Some(map);
        }
        Ok(())
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the backing file is removed on drop
    pub fn delete_on_drop(&self) -> bool {
        self.delete_on_drop
    }

    /// Change the delete-on-drop policy
    pub fn set_delete_on_drop(&mut self, delete: bool) {
        self.delete_on_drop = delete;
    }

    /// Write dirty pages back to the backing file
    pub fn flush(&self) -> Result<()> {
        if let Some(map) = &self.map {
            map.flush()?;
        }
        Ok(())
    }

    /// Flush, unmap and apply the delete policy, reporting removal failures
    pub fn close(mut self) -> Result<()> {
        self.flush()?;
        self.map = None;
        if self.delete_on_drop {
            // Drop must not try again
            self.delete_on_drop = false;
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

impl<T: DistanceElement> StorageBackend for MmapStorage<T> {
    type Element = T;
    type Error = Error;

    fn as_slice(&self) -> &[T] {
        match &self.map {
            // Length is a multiple of size_of::<T>() and the map is page aligned
            Some(map) => bytemuck::cast_slice(&map[..]),
            None => &[],
        }
    }

    fn as_mut_slice(&mut self) -> &mut [T] {
        match &mut self.map {
            Some(map) => bytemuck::cast_slice_mut(&mut map[..]),
            None => &mut [],
        }
    }

    fn reallocate(&mut self, len: usize) -> Result<()> {
        self.remap(len)
    }
}

impl<T> Drop for MmapStorage<T> {
    fn drop(&mut self) {
        self.map = None;
        if self.delete_on_drop {
            if let Err(e) = std::fs::remove_file(&self.path) {
                warn!(path = %self.path.display(), error = %e, "failed to remove backing file");
            }
        }
    }
}

impl<T> std::fmt::Debug for MmapStorage<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MmapStorage")
            .field("path", &self.path)
            .field("bytes", &self.map.as_ref().map_or(0, |m| m.len()))
            .field("delete_on_drop", &self.delete_on_drop)
            .finish()
    }
}
