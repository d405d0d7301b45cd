//! Common utilities and types shared by every part of the cache simulator.
//!
//! This module provides the building blocks used across the hierarchy:
//! 1. **Address Layout:** Power-of-two helpers and tag/set/offset decomposition.
//! 2. **Constants:** Address width and backing-store page geometry.
//! 3. **Access Kinds:** Read/write operations and demand/prefetch classification.
//! 4. **Error Handling:** Configuration, cache, trace and simulation errors.

/// Bit helpers and address decomposition.
pub mod addr;

/// Common constants used throughout the simulator.
pub mod constants;

/// Memory access type definitions.
pub mod data;

/// Error types for configuration, cache operation, and trace parsing.
pub mod error;

pub use addr::{AddressLayout, BlockAddr, is_power_of_two, log2};
pub use constants::{ADDRESS_BITS, PAGE_SHIFT, PAGE_SIZE};
pub use data::{AccessKind, AccessType};
pub use error::{CacheError, ConfigError, SimError, TraceError};
