//! Element type registry
//!
//! Every supported arithmetic type has a stable one-byte tag and a name.
//! Tags are written into compact headers, names into legacy headers. The
//! ordering below is part of the file format and must never change.

/// Element types supported in distance matrix files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ElementType {
    /// 32-bit floating point
    F32 = 0,
    /// 64-bit floating point
    F64 = 1,
    U8 = 2,
    U16 = 3,
    U32 = 4,
    U64 = 5,
    U128 = 6,
    I8 = 7,
    I16 = 8,
    I32 = 9,
    I64 = 10,
    I128 = 11,
}

impl ElementType {
    /// Every registered type, in tag order
    pub const ALL: [ElementType; 12] = [
        ElementType::F32,
        ElementType::F64,
        ElementType::U8,
        ElementType::U16,
        ElementType::U32,
        ElementType::U64,
        ElementType::U128,
        ElementType::I8,
        ElementType::I16,
        ElementType::I32,
        ElementType::I64,
        ElementType::I128,
    ];

    /// Convert from the on-disk tag
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(ElementType::F32),
            1 => Some(ElementType::F64),
            2 => Some(ElementType::U8),
            3 => Some(ElementType::U16),
            4 => Some(ElementType::U32),
            5 => Some(ElementType::U64),
            6 => Some(ElementType::U128),
            7 => Some(ElementType::I8),
            8 => Some(ElementType::I16),
            9 => Some(ElementType::I32),
            10 => Some(ElementType::I64),
            11 => Some(ElementType::I128),
            _ => None,
        }
    }

    /// Convert to the on-disk tag
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Name written by the legacy textual header
    pub const fn name(self) -> &'static str {
        match self {
            ElementType::F32 => "DM::float",
            ElementType::F64 => "DM::double",
            ElementType::U8 => "DM::uint8_t",
            ElementType::U16 => "DM::uint16_t",
            ElementType::U32 => "DM::uint32_t",
            ElementType::U64 => "DM::uint64_t",
            ElementType::U128 => "DM::uint128_t",
            ElementType::I8 => "DM::int8_t",
            ElementType::I16 => "DM::int16_t",
            ElementType::I32 => "DM::int32_t",
            ElementType::I64 => "DM::int64_t",
            ElementType::I128 => "DM::int128_t",
        }
    }

    /// Look a legacy name up in the registry
    pub fn from_name(name: &[u8]) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|ty| ty.name().as_bytes() == name)
    }

    /// Get the size in bytes for this element type
    pub const fn size_bytes(self) -> usize {
        match self {
            ElementType::U8 | ElementType::I8 => 1,
            ElementType::U16 | ElementType::I16 => 2,
            ElementType::F32 | ElementType::U32 | ElementType::I32 => 4,
            ElementType::F64 | ElementType::U64 | ElementType::I64 => 8,
            ElementType::U128 | ElementType::I128 => 16,
        }
    }

    /// Whether this is a floating point type
    pub const fn is_float(self) -> bool {
        matches!(self, ElementType::F32 | ElementType::F64)
    }
}

impl core::fmt::Display for ElementType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ElementType::F32 => write!(f, "f32"),
            ElementType::F64 => write!(f, "f64"),
            ElementType::U8 => write!(f, "u8"),
            ElementType::U16 => write!(f, "u16"),
            ElementType::U32 => write!(f, "u32"),
            ElementType::U64 => write!(f, "u64"),
            ElementType::U128 => write!(f, "u128"),
            ElementType::I8 => write!(f, "i8"),
            ElementType::I16 => write!(f, "i16"),
            ElementType::I32 => write!(f, "i32"),
            ElementType::I64 => write!(f, "i64"),
            ElementType::I128 => write!(f, "i128"),
        }
    }
}
