//! Stride Prefetch Controller.
//!
//! A two-state machine that detects a constant distance between consecutive demand
//! addresses. It commits to prefetching only after the same stride has been seen
//! `confirm_threshold` times in a row, and gives up only after more than
//! `mismatch_tolerance` consecutive accesses break the established stride.
//!
//! # Behaviour
//!
//! - **Idle:** Counts consecutive equal strides. On reaching the threshold it enters
//!   `Prefetching` and predicts `initial_degree` addresses ahead.
//! - **Prefetching:** Each access that keeps the stride predicts `steady_degree` addresses
//!   ahead and clears the mismatch count. A mismatching access only bumps the count, until
//!   the tolerance is exceeded and the controller falls back to `Idle` with the new stride.
//!
//! Targets are `addr + k * stride`, computed with 32-bit wrap-around.

use tracing::debug;

use super::Prefetcher;
use crate::config::PrefetchConfig;

/// Controller state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PrefetchState {
    /// Watching for a stable stride.
    #[default]
    Idle,
    /// A stride is established and predictions are issued.
    Prefetching,
}

/// Stride detector.
#[derive(Clone, Debug)]
pub struct StrideCovary {
    state: PrefetchState,
    last_addr: u32,
    stride: i64,
    same_count: u32,
    mismatch_count: u32,
    confirm_threshold: u32,
    initial_degree: u32,
    steady_degree: u32,
    mismatch_tolerance: u32,
}

impl StrideCovary {
    /// Creates a controller in `Idle` with no observed stride.
    pub const fn new(config: &PrefetchConfig) -> Self {
        Self {
            state: PrefetchState::Idle,
            last_addr: 0,
            stride: 0,
            same_count: 0,
            mismatch_count: 0,
            confirm_threshold: config.confirm_threshold,
            initial_degree: config.initial_degree,
            steady_degree: config.steady_degree,
            mismatch_tolerance: config.mismatch_tolerance,
        }
    }

    /// Current state.
    pub const fn state(&self) -> PrefetchState {
        self.state
    }

    /// Stride currently tracked, in bytes.
    pub const fn stride(&self) -> i64 {
        self.stride
    }

    /// Last demand address observed.
    pub const fn last_addr(&self) -> u32 {
        self.last_addr
    }

    fn targets(addr: u32, stride: i64, degree: u32) -> Vec<u32> {
        (1..=i64::from(degree))
            .map(|k| (i64::from(addr).wrapping_add(stride.wrapping_mul(k))) as u32)
            .collect()
    }
}

impl Default for StrideCovary {
    fn default() -> Self {
        Self::new(&PrefetchConfig::default())
    }
}

impl Prefetcher for StrideCovary {
    fn observe(&mut self, addr: u32) -> Vec<u32> {
        let new_stride = i64::from(addr) - i64::from(self.last_addr);
        self.last_addr = addr;

        match self.state {
            PrefetchState::Idle => {
                if new_stride == self.stride {
                    self.same_count += 1;
                } else {
                    self.stride = new_stride;
                    self.same_count = 1;
                }

                if self.same_count >= self.confirm_threshold {
                    debug!(stride = self.stride, addr, "prefetch: idle -> prefetching");
                    self.state = PrefetchState::Prefetching;
                    self.mismatch_count = 0;
                    return Self::targets(addr, self.stride, self.initial_degree);
                }
                Vec::new()
            }
            PrefetchState::Prefetching => {
                if new_stride == self.stride {
                    self.mismatch_count = 0;
                    return Self::targets(addr, self.stride, self.steady_degree);
                }

                self.mismatch_count += 1;
                if self.mismatch_count > self.mismatch_tolerance {
                    debug!(
                        old_stride = self.stride,
                        new_stride, addr, "prefetch: prefetching -> idle"
                    );
                    self.state = PrefetchState::Idle;
                    self.stride = new_stride;
                    self.same_count = 1;
                }
                Vec::new()
            }
        }
    }

    fn name(&self) -> &'static str {
        "stride"
    }
}
