//! Memory Access Types.
//!
//! This module defines the classification of memory accesses used throughout the simulator.
//! These types are used for the following:
//! 1. **Trace Decoding:** Each trace record is either a read or a write.
//! 2. **Statistics Tracking:** Demand accesses update the read/write/miss counters of the
//!    level they are issued to; prefetch accesses do not.

/// Type of memory access operation named by a trace record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessType {
    /// Data read access (`r` in a trace).
    Read,

    /// Data write access (`w` in a trace). The written value is always zero.
    Write,
}

impl AccessType {
    /// Returns the single-character trace mnemonic for this access.
    pub const fn mnemonic(self) -> char {
        match self {
            Self::Read => 'r',
            Self::Write => 'w',
        }
    }
}

/// Whether an access was requested by the program or speculatively by the prefetcher.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AccessKind {
    /// A real access issued by the trace driver.
    #[default]
    Demand,

    /// A speculative read issued by the prefetch controller.
    ///
    /// Never increments `num_read` or `num_miss` on the level it is issued to,
    /// and the flag is carried down through every lower level it traverses.
    Prefetch,
}

impl AccessKind {
    /// Returns `true` for speculative accesses.
    #[inline]
    pub const fn is_prefetch(self) -> bool {
        matches!(self, Self::Prefetch)
    }
}
