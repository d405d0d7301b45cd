//! Configuration system for the cache simulator.
//!
//! This module defines all configuration structures used to parameterize a hierarchy.
//! It provides:
//! 1. **Defaults:** Baseline geometry and latencies of the reference L1/L2/L3 hierarchy.
//! 2. **Structures:** Per-level policy and write behaviour, prefetch tuning, and the root config.
//! 3. **Validation:** The power-of-two and block arithmetic invariants a policy must satisfy.
//!
//! Configuration is supplied as JSON (`Config::from_file`) or built with `Config::default()`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::addr::is_power_of_two;
use crate::common::error::ConfigError;

/// Default configuration constants for the simulator.
///
/// These values define the reference hierarchy used when no configuration file is given.
mod defaults {
    /// Block (line) size shared by every reference level (64 bytes).
    pub const BLOCK_SIZE: u32 = 64;

    /// L1 capacity (16 KiB).
    pub const L1_SIZE: u32 = 16 * 1024;
    /// L1 associativity (direct-mapped).
    pub const L1_WAYS: u32 = 1;
    /// L1 hit latency in cycles.
    pub const L1_HIT: u32 = 1;
    /// L1 miss latency in cycles.
    pub const L1_MISS: u32 = 0;

    /// L2 capacity (128 KiB).
    pub const L2_SIZE: u32 = 128 * 1024;
    /// L2 associativity.
    pub const L2_WAYS: u32 = 8;
    /// L2 hit latency in cycles.
    pub const L2_HIT: u32 = 8;
    /// L2 miss latency in cycles.
    pub const L2_MISS: u32 = 0;

    /// L3 capacity (2 MiB).
    pub const L3_SIZE: u32 = 2 * 1024 * 1024;
    /// L3 associativity.
    pub const L3_WAYS: u32 = 16;
    /// L3 hit latency in cycles.
    pub const L3_HIT: u32 = 20;
    /// L3 miss latency in cycles (main memory access).
    pub const L3_MISS: u32 = 100;

    /// Consecutive equal strides required before prefetching starts.
    pub const PREFETCH_CONFIRM: u32 = 3;
    /// Addresses prefetched when prefetching starts.
    pub const PREFETCH_INITIAL_DEGREE: u32 = 3;
    /// Addresses prefetched on each confirming access while prefetching.
    pub const PREFETCH_STEADY_DEGREE: u32 = 2;
    /// Consecutive mismatching strides tolerated before prefetching stops.
    pub const PREFETCH_MISMATCH_TOLERANCE: u32 = 3;
}

/// Geometry and timing of one cache level.
///
/// All sizes are in bytes except `block_num` and `associativity`.
///
/// # Examples
///
/// ```
/// use memsim_core::config::Policy;
///
/// let policy = Policy::new(16, 4, 1, 1, 10);
/// assert_eq!(policy.block_num, 4);
/// assert!(policy.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Total capacity in bytes (power of two).
    pub cache_size: u32,
    /// Block size in bytes (power of two).
    pub block_size: u32,
    /// Number of blocks; derived from the sizes when omitted from JSON.
    #[serde(default)]
    pub block_num: u32,
    /// Blocks per set.
    pub associativity: u32,
    /// Cycles charged on a hit.
    pub hit_latency: u32,
    /// Cycles charged on a miss and on every propagation to the next level.
    pub miss_latency: u32,
}

impl Policy {
    /// Creates a policy, deriving `block_num` from `cache_size / block_size`.
    pub const fn new(
        cache_size: u32,
        block_size: u32,
        associativity: u32,
        hit_latency: u32,
        miss_latency: u32,
    ) -> Self {
        let block_num = match cache_size.checked_div(block_size) {
            Some(n) => n,
            None => 0,
        };
        Self {
            cache_size,
            block_size,
            block_num,
            associativity,
            hit_latency,
            miss_latency,
        }
    }

    /// Checks the policy invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant: power-of-two sizes, whole number of blocks,
    /// `block_num * block_size == cache_size`, non-zero associativity dividing `block_num`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_power_of_two(self.cache_size) {
            return Err(ConfigError::InvalidCacheSize(self.cache_size));
        }
        if !is_power_of_two(self.block_size) {
            return Err(ConfigError::InvalidBlockSize(self.block_size));
        }
        if self.cache_size % self.block_size != 0 {
            return Err(ConfigError::CacheSizeNotMultiple {
                cache_size: self.cache_size,
                block_size: self.block_size,
            });
        }
        if self.block_num.checked_mul(self.block_size) != Some(self.cache_size) {
            return Err(ConfigError::BlockCountMismatch {
                block_num: self.block_num,
                block_size: self.block_size,
                cache_size: self.cache_size,
            });
        }
        if self.associativity == 0 {
            return Err(ConfigError::ZeroAssociativity);
        }
        if self.block_num % self.associativity != 0 {
            return Err(ConfigError::AssociativityMismatch {
                block_num: self.block_num,
                associativity: self.associativity,
            });
        }
        Ok(())
    }

    /// Number of sets (`block_num / associativity`); zero for an unvalidated policy.
    pub const fn num_sets(&self) -> u32 {
        match self.block_num.checked_div(self.associativity) {
            Some(n) => n,
            None => 0,
        }
    }
}

/// Write hit and write miss behaviour of one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WritePolicy {
    /// Write-back (`true`) defers propagation to eviction; write-through (`false`)
    /// propagates every write hit immediately.
    #[serde(default = "WritePolicy::default_flag")]
    pub write_back: bool,
    /// Write-allocate (`true`) loads the block on a write miss; no-write-allocate (`false`)
    /// forwards the write to the next level without installing a block.
    #[serde(default = "WritePolicy::default_flag")]
    pub write_allocate: bool,
}

impl WritePolicy {
    /// Write-back with write-allocate.
    pub const WRITE_BACK: Self = Self {
        write_back: true,
        write_allocate: true,
    };

    /// Write-through with write-allocate.
    pub const WRITE_THROUGH: Self = Self {
        write_back: false,
        write_allocate: true,
    };

    /// Creates a write policy from its two flags.
    pub const fn new(write_back: bool, write_allocate: bool) -> Self {
        Self {
            write_back,
            write_allocate,
        }
    }

    const fn default_flag() -> bool {
        true
    }
}

impl Default for WritePolicy {
    fn default() -> Self {
        Self::WRITE_BACK
    }
}

/// Configuration of one cache level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Display name (e.g. `"L1"`); assigned from the level's position when empty.
    #[serde(default)]
    pub name: String,
    /// Geometry and timing.
    #[serde(flatten)]
    pub policy: Policy,
    /// Write hit/miss behaviour.
    #[serde(flatten)]
    pub write: WritePolicy,
}

impl LevelConfig {
    /// Creates a named level configuration.
    pub fn new(name: impl Into<String>, policy: Policy, write: WritePolicy) -> Self {
        Self {
            name: name.into(),
            policy,
            write,
        }
    }
}

/// Tuning of the stride prefetch controller.
///
/// The defaults reproduce the classic controller: three confirmations to start,
/// three addresses on start, two per confirming access, and four strikes to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefetchConfig {
    /// Enables the prefetch controller.
    #[serde(default = "PrefetchConfig::default_enabled")]
    pub enabled: bool,
    /// Consecutive equal strides required to start prefetching.
    #[serde(default = "PrefetchConfig::default_confirm")]
    pub confirm_threshold: u32,
    /// Addresses prefetched on the transition into prefetching.
    #[serde(default = "PrefetchConfig::default_initial_degree")]
    pub initial_degree: u32,
    /// Addresses prefetched on each stride-confirming access while prefetching.
    #[serde(default = "PrefetchConfig::default_steady_degree")]
    pub steady_degree: u32,
    /// Prefetching stops once consecutive mismatches exceed this count.
    #[serde(default = "PrefetchConfig::default_mismatch_tolerance")]
    pub mismatch_tolerance: u32,
}

impl PrefetchConfig {
    const fn default_enabled() -> bool {
        true
    }

    const fn default_confirm() -> u32 {
        defaults::PREFETCH_CONFIRM
    }

    const fn default_initial_degree() -> u32 {
        defaults::PREFETCH_INITIAL_DEGREE
    }

    const fn default_steady_degree() -> u32 {
        defaults::PREFETCH_STEADY_DEGREE
    }

    const fn default_mismatch_tolerance() -> u32 {
        defaults::PREFETCH_MISMATCH_TOLERANCE
    }

    /// A configuration with prefetching switched off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Checks that the confirmation threshold is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPrefetch`] if `confirm_threshold` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.confirm_threshold == 0 {
            return Err(ConfigError::InvalidPrefetch("confirm_threshold"));
        }
        Ok(())
    }
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            confirm_threshold: Self::default_confirm(),
            initial_degree: Self::default_initial_degree(),
            steady_degree: Self::default_steady_degree(),
            mismatch_tolerance: Self::default_mismatch_tolerance(),
        }
    }
}

/// Root configuration: the cache levels (top first) and the prefetch controller.
///
/// # Examples
///
/// ```
/// use memsim_core::config::Config;
///
/// let json = r#"{
///     "levels": [
///         { "name": "L1", "cache_size": 1024, "block_size": 16, "associativity": 2,
///           "hit_latency": 1, "miss_latency": 10 },
///         { "name": "L2", "cache_size": 8192, "block_size": 16, "associativity": 4,
///           "hit_latency": 8, "miss_latency": 100, "write_back": false }
///     ],
///     "prefetch": { "enabled": false }
/// }"#;
///
/// let config = Config::from_json_str(json).unwrap();
/// assert_eq!(config.levels.len(), 2);
/// assert_eq!(config.levels[0].policy.block_num, 64);
/// assert!(!config.levels[1].write.write_back);
/// assert!(!config.prefetch.enabled);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Cache levels, top (closest to the driver) first.
    #[serde(default = "Config::default_levels")]
    pub levels: Vec<LevelConfig>,
    /// Prefetch controller settings.
    #[serde(default)]
    pub prefetch: PrefetchConfig,
}

impl Config {
    fn default_levels() -> Vec<LevelConfig> {
        vec![
            LevelConfig::new(
                "L1",
                Policy::new(
                    defaults::L1_SIZE,
                    defaults::BLOCK_SIZE,
                    defaults::L1_WAYS,
                    defaults::L1_HIT,
                    defaults::L1_MISS,
                ),
                WritePolicy::WRITE_BACK,
            ),
            LevelConfig::new(
                "L2",
                Policy::new(
                    defaults::L2_SIZE,
                    defaults::BLOCK_SIZE,
                    defaults::L2_WAYS,
                    defaults::L2_HIT,
                    defaults::L2_MISS,
                ),
                WritePolicy::WRITE_BACK,
            ),
            LevelConfig::new(
                "L3",
                Policy::new(
                    defaults::L3_SIZE,
                    defaults::BLOCK_SIZE,
                    defaults::L3_WAYS,
                    defaults::L3_HIT,
                    defaults::L3_MISS,
                ),
                WritePolicy::WRITE_BACK,
            ),
        ]
    }

    /// Parses, normalizes and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and any validation failure.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(json)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`Config::from_json_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Fills in omitted level names and block counts.
    pub fn normalize(&mut self) {
        for (i, level) in self.levels.iter_mut().enumerate() {
            if level.name.is_empty() {
                level.name = format!("L{}", i + 1);
            }
            if level.policy.block_num == 0 {
                level.policy.block_num = level
                    .policy
                    .cache_size
                    .checked_div(level.policy.block_size)
                    .unwrap_or(0);
            }
        }
    }

    /// Checks that the hierarchy is non-empty and every level and the prefetcher are valid.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyHierarchy`], a [`ConfigError::Level`] wrapping the first
    /// invalid policy, or [`ConfigError::InvalidPrefetch`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.levels.is_empty() {
            return Err(ConfigError::EmptyHierarchy);
        }
        for level in &self.levels {
            level
                .policy
                .validate()
                .map_err(|source| ConfigError::Level {
                    level: level.name.clone(),
                    source: Box::new(source),
                })?;
        }
        self.prefetch.validate()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            levels: Self::default_levels(),
            prefetch: PrefetchConfig::default(),
        }
    }
}
