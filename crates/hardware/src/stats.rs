//! Cache statistics collection and reporting.
//!
//! This module tracks the per-level performance counters of the hierarchy. It provides:
//! 1. **Counters:** Reads, writes, hits, misses and accumulated latency cycles.
//! 2. **Derived metrics:** Hit and miss rates.
//! 3. **Reports:** Plain-text rendering and a serializable per-level snapshot for JSON output.
//!
//! Counters are mutated only by the level that owns them and are never reset except by
//! constructing a new level.

use std::fmt;

use serde::Serialize;

/// Access counters of one cache level.
///
/// Demand accesses always bump `num_read` or `num_write`. Prefetch reads never touch
/// `num_read` or `num_miss`, but a prefetch read that hits still records a hit and its
/// latency at the level it hits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    /// Demand reads issued to this level.
    pub num_read: u64,
    /// Writes issued to this level.
    pub num_write: u64,
    /// Lookups that found the block resident.
    pub num_hit: u64,
    /// Demand lookups that did not find the block resident.
    pub num_miss: u64,
    /// Accumulated latency in cycles.
    pub total_cycles: u64,
}

impl Statistics {
    /// Total demand accesses (`num_read + num_write`).
    pub const fn accesses(&self) -> u64 {
        self.num_read + self.num_write
    }

    /// Fraction of recorded lookups that hit, or 0 when none were recorded.
    pub fn hit_rate(&self) -> f64 {
        let total = self.num_hit + self.num_miss;
        if total == 0 {
            0.0
        } else {
            self.num_hit as f64 / total as f64
        }
    }

    /// Fraction of recorded lookups that missed, or 0 when none were recorded.
    pub fn miss_rate(&self) -> f64 {
        let total = self.num_hit + self.num_miss;
        if total == 0 {
            0.0
        } else {
            self.num_miss as f64 / total as f64
        }
    }

    #[inline]
    pub(crate) const fn record_hit(&mut self, latency: u32) {
        self.num_hit += 1;
        self.total_cycles += latency as u64;
    }

    #[inline]
    pub(crate) const fn record_miss(&mut self, latency: u32) {
        self.num_miss += 1;
        self.total_cycles += latency as u64;
    }

    #[inline]
    pub(crate) const fn charge(&mut self, latency: u32) {
        self.total_cycles += latency as u64;
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Num Read: {}", self.num_read)?;
        writeln!(f, "Num Write: {}", self.num_write)?;
        writeln!(f, "Num Hit: {}", self.num_hit)?;
        writeln!(f, "Num Miss: {}", self.num_miss)?;
        writeln!(f, "Total Cycles: {}", self.total_cycles)
    }
}

/// Snapshot of one level's statistics, serialized by the CLI's JSON output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelReport {
    /// Level name.
    pub name: String,
    /// Counters at the time of the snapshot.
    pub statistics: Statistics,
    /// Hit rate derived from the counters.
    pub hit_rate: f64,
}

impl LevelReport {
    /// Captures a level's counters.
    pub fn new(name: impl Into<String>, statistics: Statistics) -> Self {
        Self {
            name: name.into(),
            statistics,
            hit_rate: statistics.hit_rate(),
        }
    }
}
