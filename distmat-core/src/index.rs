//! Packed upper-triangle index arithmetic
//!
//! A symmetric N×N matrix with an implicit diagonal is stored as the
//! N·(N−1)/2 entries above the diagonal, row after row. Row `r` holds the
//! columns `r+1..N`, so its span has `N-r-1` elements and starts after
//! `r*N - r*(r+1)/2` elements of the preceding rows.
//!
//! All functions here are pure and unchecked unless their name says
//! otherwise. Callers are responsible for `row, col < n`.

use crate::{DistmatError, Result};

/// Number of packed entries for a matrix of `n` items
pub const fn num_entries(n: usize) -> usize {
    if n < 2 {
        0
    } else {
        n * (n - 1) / 2
    }
}

/// Overflow-checked [`num_entries`]
pub const fn checked_num_entries(n: usize) -> Option<usize> {
    if n < 2 {
        return Some(0);
    }
    // Halve whichever factor is even so the product never exceeds the result
    if n % 2 == 0 {
        (n / 2).checked_mul(n - 1)
    } else {
        n.checked_mul((n - 1) / 2)
    }
}

/// Slot of the unordered pair `{row, col}`; `row != col`
#[inline]
pub const fn offset(n: usize, row: usize, col: usize) -> usize {
    let (r, c) = if row < col { (row, col) } else { (col, row) };
    r * (2 * n - r - 1) / 2 + (c - r - 1)
}

/// Offset of the first entry of `row`, i.e. of column `row + 1`
#[inline]
pub const fn row_start(n: usize, row: usize) -> usize {
    offset(n, row, row + 1)
}

/// Number of stored entries in `row` (columns `row+1..n`)
#[inline]
pub const fn row_len(n: usize, row: usize) -> usize {
    n - row - 1
}

/// Bounds-checked [`offset`]
pub fn checked_offset(n: usize, row: usize, col: usize) -> Result<usize> {
    if row >= n {
        return Err(DistmatError::IndexOutOfRange { index: row, size: n });
    }
    if col >= n {
        return Err(DistmatError::IndexOutOfRange { index: col, size: n });
    }
    if row == col {
        return Err(DistmatError::DiagonalAccess { index: row });
    }
    Ok(offset(n, row, col))
}

/// Inverse of [`offset`]: the `(row, col)` pair with `row < col` stored at `slot`
///
/// Returns `None` when `slot` is not below `num_entries(n)`.
pub fn coordinates(n: usize, slot: usize) -> Option<(usize, usize)> {
    if slot >= num_entries(n) {
        return None;
    }

    // Largest row whose start is <= slot
    let (mut lo, mut hi) = (0usize, n - 1);
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if row_start(n, mid) <= slot {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    Some((lo, lo + 1 + (slot - row_start(n, lo))))
}
