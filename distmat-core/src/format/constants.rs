//! Format constants and magic bytes

/// Size of the compact header: one tag byte plus a u64 item count
pub const HEADER_SIZE: usize = 9;

/// Leading bytes of a gzip member
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Terminator of the legacy textual type name
pub const LEGACY_TERMINATOR: u8 = b'\n';

/// Longest legacy type name accepted before giving up on the header
pub const MAX_LEGACY_NAME_LEN: usize = 32;

/// Tag reported when a legacy name is not in the registry
pub const UNKNOWN_TAG: u8 = 0xff;
