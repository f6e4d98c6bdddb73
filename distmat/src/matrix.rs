//! The distance matrix engine
//!
//! [`DistanceMatrix`] stores the pairwise values of `n` items as the packed
//! upper triangle of a symmetric matrix. The diagonal is never stored: every
//! `(i, i)` query answers the matrix-wide default value.

use crate::config::MatrixOptions;
use crate::error::{Error, Result};
use crate::storage::Storage;
use distmat_core::index::{self, checked_num_entries};
use distmat_core::{DistanceElement, ElementType, StorageBackend};
use std::ops::Index;
use std::path::Path;
use tracing::debug;

/// Symmetric pairwise values for `n` items with an implicit diagonal
#[derive(Debug)]
pub struct DistanceMatrix<T: DistanceElement> {
    storage: Storage<T>,
    nelem: usize,
    default_value: T,
}

impl<T: DistanceElement> DistanceMatrix<T> {
    /// Heap-backed matrix for `n` items with a zero diagonal
    pub fn new(n: usize) -> Result<Self> {
        Self::with_default(n, T::ZERO)
    }

    /// Heap-backed matrix for `n` items with the given diagonal value
    pub fn with_default(n: usize, default_value: T) -> Result<Self> {
        Self::with_options(n, default_value, &MatrixOptions::heap())
    }

    /// Matrix for `n` items using the configured backend
    ///
    /// Every entry starts as [`DistanceElement::INVALID`].
    pub fn with_options(n: usize, default_value: T, options: &MatrixOptions) -> Result<Self> {
        let count = checked_num_entries(n)
            .ok_or_else(|| Error::Allocation(format!("{n} items overflow the entry count")))?;
        let storage = Storage::allocate(count, options)?;

        Ok(Self {
            storage,
            nelem: n,
            default_value,
        })
    }

    /// Number of items, i.e. the side length of the full matrix
    pub fn size(&self) -> usize {
        self.nelem
    }

    /// Whether the matrix has no items
    pub fn is_empty(&self) -> bool {
        self.nelem == 0
    }

    /// Number of stored entries, `n * (n - 1) / 2`
    pub fn num_entries(&self) -> usize {
        self.storage.len()
    }

    /// Registry entry of the element type
    pub fn element_type(&self) -> ElementType {
        T::ELEMENT_TYPE
    }

    /// Value reported for every diagonal position
    pub fn default_value(&self) -> T {
        self.default_value
    }

    /// Change the value reported for every diagonal position
    pub fn set_default_value(&mut self, value: T) {
        self.default_value = value;
    }

    /// Value at `(row, col)`
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is not below [`size`](Self::size).
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        assert!(
            row < self.nelem && col < self.nelem,
            "index ({row}, {col}) out of range for matrix of size {}",
            self.nelem
        );
        if row == col {
            return self.default_value;
        }
        self.storage.as_slice()[index::offset(self.nelem, row, col)]
    }

    /// Value at `(row, col)`, failing instead of panicking on bad indices
    pub fn try_get(&self, row: usize, col: usize) -> Result<T> {
        if row >= self.nelem || col >= self.nelem {
            return Err(Error::IndexOutOfRange {
                row,
                col,
                size: self.nelem,
            });
        }
        Ok(self.get(row, col))
    }

    /// Store `value` for the pair `{row, col}`
    ///
    /// The diagonal has no slot, so `row == col` fails with
    /// [`Error::InvalidDiagonalWrite`]; use
    /// [`set_default_value`](Self::set_default_value) instead.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        let slot = index::checked_offset(self.nelem, row, col)
            .map_err(|e| Error::from_index(e, row, col, self.nelem))?;
        self.storage.as_mut_slice()[slot] = value;
        Ok(())
    }

    /// Mutable reference to the slot of `{row, col}`
    ///
    /// Returns `None` on the diagonal or for out-of-range indices.
    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut T> {
        let slot = index::checked_offset(self.nelem, row, col).ok()?;
        self.storage.as_mut_slice().get_mut(slot)
    }

    /// Contiguous entries of `row` for columns `row + 1 .. n`
    ///
    /// This is not the full logical row: values for columns below `row`
    /// live in earlier rows' spans.
    ///
    /// # Panics
    ///
    /// Panics if `row` is not below [`size`](Self::size).
    pub fn row_span(&self, row: usize) -> &[T] {
        let (start, len) = self.span_bounds(row);
        &self.storage.as_slice()[start..start + len]
    }

    /// Mutable form of [`row_span`](Self::row_span)
    pub fn row_span_mut(&mut self, row: usize) -> &mut [T] {
        let (start, len) = self.span_bounds(row);
        &mut self.storage.as_mut_slice()[start..start + len]
    }

    fn span_bounds(&self, row: usize) -> (usize, usize) {
        assert!(
            row < self.nelem,
            "row {row} out of range for matrix of size {}",
            self.nelem
        );
        (
            index::row_start(self.nelem, row),
            index::row_len(self.nelem, row),
        )
    }

    /// Iterate over `(row, span)` for every row
    pub fn row_spans(&self) -> RowSpans<'_, T> {
        RowSpans {
            remaining: self.storage.as_slice(),
            row: 0,
            nelem: self.nelem,
        }
    }

    /// Packed entries in row-major upper-triangle order
    pub fn as_slice(&self) -> &[T] {
        self.storage.as_slice()
    }

    /// Mutable packed entries
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.storage.as_mut_slice()
    }

    /// Overwrite every stored entry with `value`
    pub fn fill(&mut self, value: T) {
        self.storage.as_mut_slice().fill(value);
    }

    /// Grow to `new_n` items
    ///
    /// Growth discards every stored value: the matrix afterwards holds
    /// only [`DistanceElement::INVALID`]. Resizing to the current size is a
    /// no-op and shrinking fails with [`Error::NotImplemented`].
    pub fn resize(&mut self, new_n: usize) -> Result<()> {
        if new_n < self.nelem {
            return Err(Error::NotImplemented("shrinking a distance matrix"));
        }
        if new_n == self.nelem {
            return Ok(());
        }

        let count = checked_num_entries(new_n)
            .ok_or_else(|| Error::Allocation(format!("{new_n} items overflow the entry count")))?;
        self.storage.reallocate(count)?;
        debug!(from = self.nelem, to = new_n, "resized distance matrix");
        self.nelem = new_n;
        Ok(())
    }

    /// Replace size and entries in one step; the storage keeps its backend
    pub(crate) fn replace_entries(&mut self, nelem: usize, entries: &[T]) -> Result<()> {
        debug_assert_eq!(entries.len(), index::num_entries(nelem));
        self.storage.reallocate(entries.len())?;
        self.storage.as_mut_slice().copy_from_slice(entries);
        self.nelem = nelem;
        Ok(())
    }

    /// Whether the entries live in a memory-mapped file
    pub fn is_memory_mapped(&self) -> bool {
        self.storage.is_memory_mapped()
    }

    /// Path of the backing file of a memory-mapped matrix
    pub fn backing_path(&self) -> Option<&Path> {
        self.storage.path()
    }

    /// Deep copy; a memory-mapped matrix is copied into a new temporary file
    pub fn try_clone(&self) -> Result<Self> {
        Ok(Self {
            storage: self.storage.try_clone()?,
            nelem: self.nelem,
            default_value: self.default_value,
        })
    }

    /// Write dirty pages of a memory-mapped matrix back to its file
    pub fn flush(&self) -> Result<()> {
        self.storage.flush()
    }

    /// Release the matrix, returning any failure to remove its backing file
    ///
    /// Dropping the matrix performs the same cleanup but only logs failures.
    pub fn close(self) -> Result<()> {
        self.storage.close()
    }
}

/// Bitwise equality: same size and byte-identical packed entries
///
/// Floating point entries holding NaN compare equal only when their bit
/// patterns match, and the diagonal default value is not compared.
impl<T: DistanceElement> PartialEq for DistanceMatrix<T> {
    fn eq(&self, other: &Self) -> bool {
        self.nelem == other.nelem
            && bytemuck::cast_slice::<T, u8>(self.as_slice())
                == bytemuck::cast_slice::<T, u8>(other.as_slice())
    }
}

impl<T: DistanceElement> Index<(usize, usize)> for DistanceMatrix<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(
            row < self.nelem && col < self.nelem,
            "index ({row}, {col}) out of range for matrix of size {}",
            self.nelem
        );
        if row == col {
            return &self.default_value;
        }
        &self.storage.as_slice()[index::offset(self.nelem, row, col)]
    }
}

/// Iterator over the row spans of a [`DistanceMatrix`]
pub struct RowSpans<'a, T> {
    remaining: &'a [T],
    row: usize,
    nelem: usize,
}

impl<'a, T> Iterator for RowSpans<'a, T> {
    type Item = (usize, &'a [T]);

    fn next(&mut self) -> Option<Self::Item> {
        if self.row >= self.nelem {
            return None;
        }

        let (span, rest) = self.remaining.split_at(self.nelem - self.row - 1);
        self.remaining = rest;
        let row = self.row;
        self.row += 1;
        Some((row, span))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.nelem - self.row;
        (len, Some(len))
    }
}

impl<'a, T> ExactSizeIterator for RowSpans<'a, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> DistanceMatrix<u32> {
        let mut mat = DistanceMatrix::new(n).unwrap();
        for (slot, value) in mat.as_mut_slice().iter_mut().enumerate() {
            *value = slot as u32;
        }
        mat
    }

    #[test]
    fn test_new_fills_sentinel() {
        let mat = DistanceMatrix::<i64>::new(5).unwrap();
        assert_eq!(mat.size(), 5);
        assert_eq!(mat.num_entries(), 10);
        assert!(mat.as_slice().iter().all(|&v| v == -1));
        assert_eq!(mat.get(3, 3), 0);
    }

    #[test]
    fn test_empty_and_single() {
        let empty = DistanceMatrix::<f32>::new(0).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.num_entries(), 0);
        assert_eq!(empty.row_spans().count(), 0);

        let single = DistanceMatrix::<f32>::with_default(1, 2.5).unwrap();
        assert_eq!(single.num_entries(), 0);
        assert_eq!(single.get(0, 0), 2.5);
        assert!(single.row_span(0).is_empty());
    }

    #[test]
    fn test_set_get_symmetry() {
        let mut mat = DistanceMatrix::<f64>::new(6).unwrap();
        mat.set(4, 1, 0.25).unwrap();
        assert_eq!(mat.get(1, 4), 0.25);
        assert_eq!(mat.get(4, 1), 0.25);
        assert_eq!(mat[(1, 4)], 0.25);
        assert_eq!(mat.as_slice()[index::offset(6, 1, 4)], 0.25);
    }

    #[test]
    fn test_diagonal() {
        let mut mat = DistanceMatrix::<u8>::with_default(3, 7).unwrap();
        assert_eq!(mat.get(2, 2), 7);
        mat.set_default_value(9);
        assert_eq!(mat.get(0, 0), 9);
        assert_eq!(mat[(1, 1)], 9);

        assert!(matches!(
            mat.set(1, 1, 3),
            Err(Error::InvalidDiagonalWrite { index: 1 })
        ));
        assert!(mat.get_mut(2, 2).is_none());
    }

    #[test]
    fn test_checked_access() {
        let mut mat = DistanceMatrix::<u16>::new(3).unwrap();
        assert!(matches!(
            mat.set(0, 3, 1),
            Err(Error::IndexOutOfRange { row: 0, col: 3, size: 3 })
        ));
        assert!(matches!(
            mat.try_get(5, 0),
            Err(Error::IndexOutOfRange { size: 3, .. })
        ));
        assert_eq!(mat.try_get(0, 0).unwrap(), 0);
        assert!(mat.get_mut(0, 7).is_none());

        *mat.get_mut(2, 0).unwrap() = 11;
        assert_eq!(mat.get(0, 2), 11);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_get_panics_out_of_range() {
        let mat = DistanceMatrix::<u16>::new(3).unwrap();
        mat.get(3, 0);
    }

    #[test]
    fn test_row_span_matches_get() {
        let mat = numbered(7);
        for row in 0..7 {
            let span = mat.row_span(row);
            assert_eq!(span.len(), 7 - row - 1);
            for (k, &value) in span.iter().enumerate() {
                assert_eq!(value, mat.get(row, row + 1 + k));
            }
        }
    }

    #[test]
    fn test_row_spans_iterator() {
        let mat = numbered(5);
        let spans: Vec<_> = mat.row_spans().collect();
        assert_eq!(spans.len(), 5);
        assert_eq!(mat.row_spans().len(), 5);
        for (row, span) in spans {
            assert_eq!(span, mat.row_span(row));
        }
    }

    #[test]
    fn test_row_span_mut() {
        let mut mat = DistanceMatrix::<i8>::new(4).unwrap();
        mat.row_span_mut(1).copy_from_slice(&[4, 5]);
        assert_eq!(mat.get(2, 1), 4);
        assert_eq!(mat.get(3, 1), 5);
    }

    #[test]
    fn test_resize_policy() {
        let mut mat = numbered(4);
        let before = mat.try_clone().unwrap();

        mat.resize(4).unwrap();
        assert_eq!(mat, before);

        assert!(matches!(mat.resize(2), Err(Error::NotImplemented(_))));
        assert_eq!(mat, before);

        mat.resize(9).unwrap();
        assert_eq!(mat.size(), 9);
        assert_eq!(mat.num_entries(), 36);
        assert!(mat.as_slice().iter().all(|&v| v == u32::MAX));
    }

    #[test]
    fn test_equality_is_bitwise() {
        let mut a = DistanceMatrix::<f32>::new(3).unwrap();
        a.fill(f32::NAN);
        let b = a.try_clone().unwrap();
        assert_eq!(a, b);

        let mut c = DistanceMatrix::<f32>::new(3).unwrap();
        c.fill(0.0);
        let mut d = c.try_clone().unwrap();
        d.fill(-0.0);
        assert_ne!(c, d);

        let mut e = c.try_clone().unwrap();
        e.set_default_value(4.0);
        assert_eq!(c, e);

        assert_ne!(c, DistanceMatrix::<f32>::new(4).unwrap());
    }
}
