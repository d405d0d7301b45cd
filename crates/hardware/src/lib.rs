//! Multi-level cache hierarchy simulator library.
//!
//! This crate replays memory access traces against a configurable chain of set-associative
//! caches and reports per-level statistics. It provides:
//! 1. **Cache:** Address decomposition, LRU replacement, and the write-back/write-through and
//!    write-allocate/no-write-allocate policies, with misses delegated level by level.
//! 2. **Prefetch:** A stride detector that issues speculative reads through the hierarchy.
//! 3. **Memory:** A lazily paged backing store beneath the lowest level.
//! 4. **Simulation:** Trace parsing, configuration, hierarchy assembly, and statistics.

/// Common types and constants (address layout, access kinds, errors).
pub mod common;
/// Simulator configuration (defaults, per-level policies, prefetch tuning).
pub mod config;
/// Set-associative cache level, blocks, and replacement policies.
pub mod cache;
/// Backing store trait and paged memory.
pub mod memory;
/// Prefetch controllers.
pub mod prefetch;
/// Hierarchy ownership and trace replay.
pub mod sim;
/// Per-level statistics and reports.
pub mod stats;
/// Trace file parsing.
pub mod trace;

/// Root configuration type; use `Config::default()` or `Config::from_file`.
pub use crate::config::Config;
/// One cache level; chain levels with `NextLevel`.
pub use crate::cache::{CacheLevel, NextLevel};
/// Umbrella error of a simulation run.
pub use crate::common::error::SimError;
/// Trace driver and the hierarchy it owns.
pub use crate::sim::{Hierarchy, RunSummary, Simulator};
