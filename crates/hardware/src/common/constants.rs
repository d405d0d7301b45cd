//! Global Simulator Constants.
//!
//! This module defines constants shared by the address decoder and the backing store:
//! 1. **Address Constants:** Width of a simulated physical address.
//! 2. **Memory Constants:** Page size, shift and offset mask for lazy page allocation.

/// Width of a simulated address in bits.
pub const ADDRESS_BITS: u32 = 32;

/// Backing-store page size in bytes (4KB).
pub const PAGE_SIZE: u32 = 4096;

/// Number of bits to shift to convert between bytes and pages.
pub const PAGE_SHIFT: u32 = 12;

/// Mask for extracting the page offset from an address.
pub const PAGE_OFFSET_MASK: u32 = PAGE_SIZE - 1;
