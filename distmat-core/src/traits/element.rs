//! Matrix element type constraints
//!
//! Resolves the type registry entry of each element type at compile time
//! through associated constants.

use crate::format::ElementType;

/// Trait for types that can be stored as distance matrix entries
///
/// Elements are plain old data so that packed buffers can be viewed as
/// bytes for serialization and bitwise comparison.
pub trait DistanceElement:
    bytemuck::Pod
    + PartialEq
    + core::fmt::Debug
    + core::fmt::Display
    + core::fmt::LowerExp
    + Send
    + Sync
{
    /// Registry entry for this type
    const ELEMENT_TYPE: ElementType;

    /// Value marking an entry that was never written
    const INVALID: Self;

    /// Additive identity, the usual diagonal value
    const ZERO: Self;

    /// Get the registry entry for this type
    fn element_type() -> ElementType {
        Self::ELEMENT_TYPE
    }

    /// Get the size in bytes of this element type
    fn size_bytes() -> usize {
        core::mem::size_of::<Self>()
    }
}

macro_rules! impl_distance_element {
    ($type:ty, $variant:ident, $invalid:expr) => {
        impl DistanceElement for $type {
            const ELEMENT_TYPE: ElementType = ElementType::$variant;
            const INVALID: Self = $invalid;
            const ZERO: Self = 0 as $type;
        }
    };
}

// Integers use the all-bits-set pattern, floats their maximum
impl_distance_element!(f32, F32, f32::MAX);
impl_distance_element!(f64, F64, f64::MAX);
impl_distance_element!(u8, U8, u8::MAX);
impl_distance_element!(u16, U16, u16::MAX);
impl_distance_element!(u32, U32, u32::MAX);
impl_distance_element!(u64, U64, u64::MAX);
impl_distance_element!(u128, U128, u128::MAX);
impl_distance_element!(i8, I8, -1);
impl_distance_element!(i16, I16, -1);
impl_distance_element!(i32, I32, -1);
impl_distance_element!(i64, I64, -1);
impl_distance_element!(i128, I128, -1);
