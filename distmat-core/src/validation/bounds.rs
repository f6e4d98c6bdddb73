//! Size and bounds validation
//!
//! Item counts come straight from file headers, so every conversion from
//! an item count to an entry count or byte count is checked.

use crate::index::checked_num_entries;
use crate::{DistmatError, Result};

/// Number of packed entries for `nelem` items read from a header
pub fn entry_count(nelem: u64) -> Result<usize> {
    let nelem = usize::try_from(nelem).map_err(|_| DistmatError::SizeOverflow)?;
    checked_num_entries(nelem).ok_or(DistmatError::SizeOverflow)
}

/// Bytes occupied by `count` elements of type `T`
pub const fn byte_size<T>(count: usize) -> Result<usize> {
    match count.checked_mul(core::mem::size_of::<T>()) {
        // Slices may not exceed isize::MAX bytes
        Some(bytes) if bytes <= isize::MAX as usize => Ok(bytes),
        _ => Err(DistmatError::SizeOverflow),
    }
}

/// Entry count and payload byte count for `nelem` items of type `T`
pub fn payload_size<T>(nelem: u64) -> Result<(usize, usize)> {
    let entries = entry_count(nelem)?;
    Ok((entries, byte_size::<T>(entries)?))
}
