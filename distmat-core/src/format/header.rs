//! Distance matrix file header definitions
//!
//! Two header layouts exist. The compact one is a single type tag byte
//! followed by the item count. The legacy one spells the type name out as a
//! newline-terminated string before the item count. In both layouts the
//! count is a u64 in native byte order and the packed entries follow
//! immediately.

use super::constants::{HEADER_SIZE, LEGACY_TERMINATOR, MAX_LEGACY_NAME_LEN, UNKNOWN_TAG};
use super::element_type::ElementType;
use crate::{DistmatError, Result};

/// Compact header for distance matrix files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileHeader {
    /// Type registry tag
    pub tag: u8,
    /// Number of items (the matrix is nelem × nelem)
    pub nelem: u64,
}

impl FileHeader {
    /// Size of the header in bytes
    pub const SIZE: usize = HEADER_SIZE;

    /// Create a header for `nelem` items of `element_type`
    pub const fn new(element_type: ElementType, nelem: u64) -> Self {
        Self {
            tag: element_type.tag(),
            nelem,
        }
    }

    /// Parse header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(DistmatError::MalformedHeader);
        }

        let mut count = [0u8; 8];
        count.copy_from_slice(&bytes[1..Self::SIZE]);

        Ok(Self {
            tag: bytes[0],
            nelem: u64::from_ne_bytes(count),
        })
    }

    /// Convert header to a byte array
    pub const fn to_bytes_array(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0] = self.tag;

        let count = self.nelem.to_ne_bytes();
        let mut i = 0;
        while i < 8 {
            bytes[1 + i] = count[i];
            i += 1;
        }

        bytes
    }

    /// Element type named by the tag
    pub fn element_type(&self) -> Result<ElementType> {
        ElementType::from_tag(self.tag).ok_or(DistmatError::UnknownTag(self.tag))
    }

    /// Check that the tag names `expected`
    pub fn expect(&self, expected: ElementType) -> Result<()> {
        if self.tag != expected.tag() {
            return Err(DistmatError::MagicMismatch {
                expected: expected.tag(),
                found: self.tag,
            });
        }
        Ok(())
    }
}

/// Legacy textual header: `<type name>\n` followed by the u64 count
pub struct LegacyHeader;

impl LegacyHeader {
    /// Bytes of the name line for `element_type`, terminator excluded
    pub const fn name_line(element_type: ElementType) -> &'static [u8] {
        element_type.name().as_bytes()
    }

    /// Locate the name terminator in the first bytes of a file
    ///
    /// Returns the length of the name. Fails with `MagicMismatch` when no
    /// terminator appears within [`MAX_LEGACY_NAME_LEN`] bytes, since such
    /// input cannot be a legacy header for any registered type.
    pub fn name_len(prefix: &[u8], expected: ElementType) -> Result<usize> {
        prefix
            .iter()
            .take(MAX_LEGACY_NAME_LEN + 1)
            .position(|&b| b == LEGACY_TERMINATOR)
            .ok_or(DistmatError::MagicMismatch {
                expected: expected.tag(),
                found: UNKNOWN_TAG,
            })
    }

    /// Check a name line (terminator excluded) against `expected`
    pub fn expect(name: &[u8], expected: ElementType) -> Result<()> {
        if name == Self::name_line(expected) {
            return Ok(());
        }
        let found = ElementType::from_name(name).map_or(UNKNOWN_TAG, ElementType::tag);
        Err(DistmatError::MagicMismatch {
            expected: expected.tag(),
            found,
        })
    }
}
