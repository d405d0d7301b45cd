//! Backing store beneath the lowest cache level.
//!
//! This module provides:
//! 1. **Interface:** The `BackingStore` trait, the byte-granular contract the lowest cache
//!    level delegates to on a miss, write-back, or bypassed write.
//! 2. **Implementation:** `PagedMemory`, a flat 32-bit address space backed by lazily
//!    allocated fixed-size pages.
//!
//! Page allocation is the driver's responsibility. The cache engine never allocates; touching
//! an unallocated page is a fatal [`CacheError::PageNotAllocated`].

/// Lazily paged byte storage.
pub mod paged;

pub use paged::PagedMemory;

use crate::common::error::CacheError;

/// Flat byte-addressable storage serviced below the cache hierarchy.
pub trait BackingStore {
    /// Reads one byte.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::PageNotAllocated`] if the page holding `addr` does not exist.
    fn read_byte(&mut self, addr: u32) -> Result<u8, CacheError>;

    /// Writes one byte.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::PageNotAllocated`] if the page holding `addr` does not exist.
    fn write_byte(&mut self, addr: u32, value: u8) -> Result<(), CacheError>;

    /// Returns `true` if the page holding `addr` has been allocated.
    fn page_exists(&self, addr: u32) -> bool;

    /// Allocates (zero-filled) the page holding `addr`; a no-op if it already exists.
    fn allocate_page(&mut self, addr: u32);

    /// Allocates the page holding `addr` only if it is missing.
    fn ensure_page(&mut self, addr: u32) {
        if !self.page_exists(addr) {
            self.allocate_page(addr);
        }
    }
}
