//! Storage backend capability
//!
//! A backend owns the flat packed buffer of a distance matrix. Whether the
//! buffer lives on the heap or in a memory-mapped file is invisible through
//! this interface.

/// Trait for backends that hold the packed entries of a distance matrix
pub trait StorageBackend {
    /// The element type stored by this backend
    type Element;

    /// Error type for (re)allocation
    type Error;

    /// Get the packed entries
    fn as_slice(&self) -> &[Self::Element];

    /// Get the packed entries mutably
    fn as_mut_slice(&mut self) -> &mut [Self::Element];

    /// Number of elements held
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Whether the backend holds no elements
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace the buffer with one of `len` elements
    ///
    /// The new buffer is filled with the element type's invalid sentinel;
    /// previous contents are not carried over.
    fn reallocate(&mut self, len: usize) -> Result<(), Self::Error>;
}
