//! Prefetch controllers.
//!
//! A prefetch controller watches the stream of demand addresses issued to the top cache
//! level and predicts addresses worth fetching ahead of time. Controllers only predict;
//! the driver filters out targets already resident in the top level and issues the rest
//! as prefetch reads.

/// Stride detector with confirm/tolerate hysteresis.
pub mod stride;

pub use self::stride::{PrefetchState, StrideCovary};

use std::fmt;

/// Trait for prefetch controllers driven by demand addresses.
pub trait Prefetcher: fmt::Debug {
    /// Observes one demand access and returns the addresses to prefetch, nearest first.
    ///
    /// Never called for the prefetch reads a controller itself triggers.
    fn observe(&mut self, addr: u32) -> Vec<u32>;

    /// Short identifier used in logs.
    fn name(&self) -> &'static str;
}
