//! Simulation driver.
//!
//! This module assembles and drives a cache hierarchy. It provides:
//! 1. **Hierarchy:** Ownership of every cache level and the backing store, wired top to bottom.
//! 2. **Simulator:** Replays trace records against the top level and issues stride prefetches.

/// Ownership and wiring of the cache levels.
pub mod hierarchy;

/// Trace replay and prefetch issue.
pub mod simulator;

pub use self::hierarchy::Hierarchy;
pub use self::simulator::{RunSummary, Simulator};
