//! Cache Replacement Policies.
//!
//! Implements victim selection for set-associative caches.
//!
//! # Policies
//!
//! - `Lru`: Least Recently Used, driven by per-block reference stamps.

/// Least Recently Used replacement policy.
pub mod lru;

pub use lru::LruPolicy;

use std::fmt;

use super::block::Block;

/// Trait for cache replacement policies.
///
/// Policies inspect the blocks of a single set and choose the slot a new block is installed
/// into. Recency state lives in the blocks themselves (`last_reference`), stamped by the
/// owning level on every touch.
pub trait ReplacementPolicy: fmt::Debug {
    /// Selects the way to fill within `set`.
    ///
    /// # Arguments
    ///
    /// * `set` - The `associativity` blocks of the target set, in slot order.
    ///
    /// # Returns
    ///
    /// The index of the way to (re)use, relative to the start of the set.
    fn select_victim(&self, set: &[Block]) -> usize;

    /// Short policy name for reports.
    fn name(&self) -> &'static str;
}
