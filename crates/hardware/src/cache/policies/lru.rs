//! Least Recently Used (LRU) Replacement Policy.
//!
//! This policy evicts the block that has not been touched for the longest time. Instead of a
//! usage stack per set, every access stamps the touched block with the level's monotonically
//! increasing reference counter, so the block with the smallest stamp is the LRU block.
//!
//! # Performance
//!
//! - **Time Complexity:** `select_victim()`: O(W) where W is the associativity
//! - **Space Complexity:** O(1) beyond the per-block stamp
//! - **Best Case:** Working sets that fit in a set's ways with good temporal locality
//! - **Worst Case:** Cyclic scans one block larger than the set (thrashing)

use super::ReplacementPolicy;
use crate::cache::block::Block;

/// LRU policy over reference stamps.
#[derive(Debug, Clone, Copy, Default)]
pub struct LruPolicy;

impl LruPolicy {
    /// Creates a new LRU policy.
    pub const fn new() -> Self {
        Self
    }
}

impl ReplacementPolicy for LruPolicy {
    /// Prefers the first invalid slot; otherwise returns the slot with the smallest
    /// `last_reference`, the lowest index winning ties.
    fn select_victim(&self, set: &[Block]) -> usize {
        if let Some(way) = set.iter().position(|b| !b.valid) {
            return way;
        }
        set.iter()
            .enumerate()
            .min_by_key(|(_, b)| b.last_reference)
            .map_or(0, |(way, _)| way)
    }

    fn name(&self) -> &'static str {
        "LRU"
    }
}
