//! Simulator error types.
//!
//! Every error in this crate is unrecoverable. A cache hierarchy models a closed,
//! deterministic hardware structure, so any inconsistency means the model itself is broken
//! and continuing would only produce meaningless statistics. This module provides:
//! 1. **Configuration Errors:** Invalid cache policies and unreadable configuration files.
//! 2. **Cache Errors:** Internal invariant violations detected while servicing an access.
//! 3. **Trace Errors:** Malformed trace input.
//! 4. **Simulation Errors:** The umbrella type returned by the trace driver.

use std::io;

use thiserror::Error;

/// Invalid cache or hierarchy configuration, detected before any access is simulated.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A size that must be a power of two is not.
    #[error("{value} is not a power of two")]
    NotPowerOfTwo {
        /// Offending value.
        value: u32,
    },

    /// The total cache size is not a power of two.
    #[error("invalid cache size {0}: must be a power of two")]
    InvalidCacheSize(u32),

    /// The block size is not a power of two.
    #[error("invalid block size {0}: must be a power of two")]
    InvalidBlockSize(u32),

    /// The cache size is not a whole number of blocks.
    #[error("cache size {cache_size} is not a multiple of block size {block_size}")]
    CacheSizeNotMultiple {
        /// Total cache size in bytes.
        cache_size: u32,
        /// Block size in bytes.
        block_size: u32,
    },

    /// `block_num * block_size` does not equal the cache size.
    #[error("block_num {block_num} * block_size {block_size} != cache_size {cache_size}")]
    BlockCountMismatch {
        /// Number of blocks.
        block_num: u32,
        /// Block size in bytes.
        block_size: u32,
        /// Total cache size in bytes.
        cache_size: u32,
    },

    /// Associativity of zero.
    #[error("associativity must be at least 1")]
    ZeroAssociativity,

    /// The block count is not divisible by the associativity.
    #[error("block_num {block_num} is not divisible by associativity {associativity}")]
    AssociativityMismatch {
        /// Number of blocks.
        block_num: u32,
        /// Blocks per set.
        associativity: u32,
    },

    /// A hierarchy with no cache levels.
    #[error("cache hierarchy must contain at least one level")]
    EmptyHierarchy,

    /// A prefetch confirmation threshold of zero.
    #[error("prefetch parameter `{0}` must be at least 1")]
    InvalidPrefetch(&'static str),

    /// A level that failed validation, tagged with its name.
    #[error("level {level}: {source}")]
    Level {
        /// Name of the offending level.
        level: String,
        /// Underlying validation failure.
        #[source]
        source: Box<ConfigError>,
    },

    /// Malformed JSON configuration.
    #[error("configuration parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Configuration file could not be read.
    #[error("configuration I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Internal invariant violation detected while servicing an access.
///
/// These represent "this should never happen" conditions; there is no retry path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// A scanned block's recorded set id disagrees with the set computed from the address.
    #[error("inconsistent set id in block {slot}: expected {expected}, found {found}")]
    SetIdMismatch {
        /// Index of the block within the level's block array.
        slot: usize,
        /// Set id computed from the address.
        expected: u32,
        /// Set id recorded in the block.
        found: u32,
    },

    /// A block that was just installed could not be located.
    #[error("data for address {addr:#010x} not resident after block installation")]
    NotResidentAfterFill {
        /// Address being serviced.
        addr: u32,
    },

    /// The backing store was accessed on a page the driver never allocated.
    #[error("backing store page for address {addr:#010x} is not allocated")]
    PageNotAllocated {
        /// Faulting address.
        addr: u32,
    },

    /// The next-level reference was dropped while this level was still in use.
    #[error("next level of cache {level} no longer exists")]
    DetachedLevel {
        /// Name of the level whose next level vanished.
        level: String,
    },
}

/// Malformed trace input.
#[derive(Debug, Error)]
pub enum TraceError {
    /// An operation token other than `r` or `w`.
    #[error("record {record}: illegal operation `{token}`")]
    IllegalOp {
        /// Zero-based record index.
        record: usize,
        /// Offending token.
        token: String,
    },

    /// An address token that is not 32-bit hexadecimal.
    #[error("record {record}: malformed address `{token}`")]
    BadAddress {
        /// Zero-based record index.
        record: usize,
        /// Offending token.
        token: String,
    },

    /// The input ended after an operation token.
    #[error("record {record}: missing address")]
    MissingAddress {
        /// Zero-based record index.
        record: usize,
    },

    /// The trace file could not be read.
    #[error("trace I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Any failure of a simulation run.
#[derive(Debug, Error)]
pub enum SimError {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Internal cache invariant violation.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Malformed trace.
    #[error(transparent)]
    Trace(#[from] TraceError),
}
