//! Lazily Paged Memory.
//!
//! Backing storage for the simulated 32-bit address space. Pages of [`PAGE_SIZE`] bytes are
//! created on demand by the driver and zero-filled, so host memory grows only with the set of
//! pages a trace actually touches.

use std::collections::HashMap;

use super::BackingStore;
use crate::common::constants::{PAGE_OFFSET_MASK, PAGE_SHIFT, PAGE_SIZE};
use crate::common::error::CacheError;

/// Byte storage keyed by page number.
#[derive(Debug, Default)]
pub struct PagedMemory {
    pages: HashMap<u32, Box<[u8]>>,
}

impl PagedMemory {
    /// Creates an empty address space with no pages allocated.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pages allocated so far.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Host bytes held by allocated pages.
    pub fn allocated_bytes(&self) -> usize {
        self.pages.len() * PAGE_SIZE as usize
    }

    #[inline]
    const fn split(addr: u32) -> (u32, usize) {
        (addr >> PAGE_SHIFT, (addr & PAGE_OFFSET_MASK) as usize)
    }
}

impl BackingStore for PagedMemory {
    fn read_byte(&mut self, addr: u32) -> Result<u8, CacheError> {
        let (page, offset) = Self::split(addr);
        self.pages
            .get(&page)
            .map(|bytes| bytes[offset])
            .ok_or(CacheError::PageNotAllocated { addr })
    }

    fn write_byte(&mut self, addr: u32, value: u8) -> Result<(), CacheError> {
        let (page, offset) = Self::split(addr);
        let bytes = self
            .pages
            .get_mut(&page)
            .ok_or(CacheError::PageNotAllocated { addr })?;
        bytes[offset] = value;
        Ok(())
    }

    fn page_exists(&self, addr: u32) -> bool {
        self.pages.contains_key(&Self::split(addr).0)
    }

    fn allocate_page(&mut self, addr: u32) {
        let (page, _) = Self::split(addr);
        let _ = self
            .pages
            .entry(page)
            .or_insert_with(|| vec![0u8; PAGE_SIZE as usize].into_boxed_slice());
    }
}
