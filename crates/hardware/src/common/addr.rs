//! Bit helpers and cache address decomposition.
//!
//! This module splits a 32-bit address into the three fields a set-associative cache uses:
//! 1. **Offset:** The low `log2(block_size)` bits, selecting a byte within a block.
//! 2. **Set:** The next `log2(num_sets)` bits, selecting the set to search.
//! 3. **Tag:** The remaining high bits, identifying which memory block occupies a slot.
//!
//! The inverse operation rebuilds a block's base address from its `(tag, set)` pair and is
//! used when a dirty block is written back to the next level.

use super::constants::ADDRESS_BITS;
use super::error::ConfigError;

/// Returns `true` if `n` is a non-zero power of two.
#[inline]
pub const fn is_power_of_two(n: u32) -> bool {
    n != 0 && (n & (n - 1)) == 0
}

/// Integer base-2 logarithm of a power of two.
///
/// # Errors
///
/// Returns [`ConfigError::NotPowerOfTwo`] when `n` is zero or not a power of two.
pub fn log2(n: u32) -> Result<u32, ConfigError> {
    if is_power_of_two(n) {
        Ok(n.trailing_zeros())
    } else {
        Err(ConfigError::NotPowerOfTwo { value: n })
    }
}

/// Mask with the low `bits` bits set.
#[inline]
const fn low_mask(bits: u32) -> u32 {
    if bits >= ADDRESS_BITS {
        u32::MAX
    } else {
        (1 << bits) - 1
    }
}

/// An address split into its cache fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockAddr {
    /// High-order bits identifying the memory block.
    pub tag: u32,
    /// Set the block maps to.
    pub set: u32,
    /// Byte offset within the block.
    pub offset: u32,
}

/// Field widths of a cache's address decomposition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressLayout {
    offset_bits: u32,
    set_bits: u32,
}

impl AddressLayout {
    /// Builds the layout for a cache with `block_size`-byte blocks and `num_sets` sets.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotPowerOfTwo`] if either argument is not a power of two.
    pub fn new(block_size: u32, num_sets: u32) -> Result<Self, ConfigError> {
        let offset_bits = log2(block_size)?;
        let set_bits = log2(num_sets)?;
        Ok(Self {
            offset_bits,
            set_bits,
        })
    }

    /// Number of offset bits (`log2(block_size)`).
    #[inline]
    pub const fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    /// Number of set-index bits (`log2(num_sets)`).
    #[inline]
    pub const fn set_bits(&self) -> u32 {
        self.set_bits
    }

    /// Number of tag bits.
    #[inline]
    pub const fn tag_bits(&self) -> u32 {
        ADDRESS_BITS.saturating_sub(self.offset_bits + self.set_bits)
    }

    /// Byte offset of `addr` within its block.
    #[inline]
    pub const fn offset(&self, addr: u32) -> u32 {
        addr & low_mask(self.offset_bits)
    }

    /// Set index of `addr`.
    #[inline]
    pub const fn set_index(&self, addr: u32) -> u32 {
        match addr.checked_shr(self.offset_bits) {
            Some(v) => v & low_mask(self.set_bits),
            None => 0,
        }
    }

    /// Tag of `addr`.
    #[inline]
    pub const fn tag(&self, addr: u32) -> u32 {
        match addr.checked_shr(self.offset_bits + self.set_bits) {
            Some(v) => v & low_mask(self.tag_bits()),
            None => 0,
        }
    }

    /// Splits `addr` into tag, set and offset.
    #[inline]
    pub const fn decompose(&self, addr: u32) -> BlockAddr {
        BlockAddr {
            tag: self.tag(addr),
            set: self.set_index(addr),
            offset: self.offset(addr),
        }
    }

    /// Rebuilds the base address of the block identified by `(tag, set)`.
    #[inline]
    pub const fn base_address(&self, tag: u32, set: u32) -> u32 {
        let tag_part = match tag.checked_shl(self.offset_bits + self.set_bits) {
            Some(v) => v,
            None => 0,
        };
        let set_part = match set.checked_shl(self.offset_bits) {
            Some(v) => v,
            None => 0,
        };
        tag_part | set_part
    }

    /// Clears the offset bits of `addr`.
    #[inline]
    pub const fn block_base(&self, addr: u32) -> u32 {
        addr & !low_mask(self.offset_bits)
    }
}
