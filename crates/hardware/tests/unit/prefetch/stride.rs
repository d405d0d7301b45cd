//! Stride Prefetch Controller Tests.
//!
//! Verifies the confirm-then-prefetch hysteresis of the stride detector: three
//! equal strides to start, two addresses per confirming access, and more than
//! three consecutive mismatches to stop.

use memsim_core::config::PrefetchConfig;
use memsim_core::prefetch::{PrefetchState, Prefetcher, StrideCovary};

fn feed(pf: &mut StrideCovary, addrs: &[u32]) -> Vec<Vec<u32>> {
    addrs.iter().map(|&a| pf.observe(a)).collect()
}

// ══════════════════════════════════════════════════════════
// 1. Confirmation
// ══════════════════════════════════════════════════════════

/// The third consecutive stride of 4 starts prefetching three addresses ahead.
#[test]
fn third_equal_stride_starts_prefetching() {
    let mut pf = StrideCovary::default();
    let issued = feed(&mut pf, &[0, 4, 8, 12]);

    assert!(issued[..3].iter().all(Vec::is_empty));
    assert_eq!(issued[3], vec![16, 20, 24]);
    assert_eq!(pf.state(), PrefetchState::Prefetching);
    assert_eq!(pf.stride(), 4);
    assert_eq!(pf.last_addr(), 12);
}

#[test]
fn broken_run_restarts_confirmation() {
    let mut pf = StrideCovary::default();
    let issued = feed(&mut pf, &[100, 108, 116, 120, 124, 128]);

    // 100, 8, 8 | 4, 4, 4
    assert!(issued[..5].iter().all(Vec::is_empty));
    assert_eq!(issued[5], vec![132, 136, 140]);
}

#[test]
fn descending_stride() {
    let mut pf = StrideCovary::default();
    let issued = feed(&mut pf, &[100, 96, 92, 88]);
    assert_eq!(issued[3], vec![84, 80, 76]);
    assert_eq!(pf.stride(), -4);
}

#[test]
fn targets_wrap_around_address_space() {
    let mut pf = StrideCovary::default();
    let issued = feed(&mut pf, &[0xFFFF_FFD8, 0xFFFF_FFE0, 0xFFFF_FFE8, 0xFFFF_FFF0]);
    assert_eq!(issued[3], vec![0xFFFF_FFF8, 0x0, 0x8]);
}

// ══════════════════════════════════════════════════════════
// 2. Steady state
// ══════════════════════════════════════════════════════════

#[test]
fn confirming_access_prefetches_two_ahead() {
    let mut pf = StrideCovary::default();
    let _ = feed(&mut pf, &[0, 4, 8, 12]);
    assert_eq!(pf.observe(16), vec![20, 24]);
    assert_eq!(pf.observe(20), vec![24, 28]);
}

#[test]
fn three_mismatches_are_tolerated() {
    let mut pf = StrideCovary::default();
    let _ = feed(&mut pf, &[0, 4, 8, 12]);
    let issued = feed(&mut pf, &[100, 200, 300]);

    assert!(issued.iter().all(Vec::is_empty));
    assert_eq!(pf.state(), PrefetchState::Prefetching);
    assert_eq!(pf.stride(), 4);
}

#[test]
fn matching_stride_clears_mismatches() {
    let mut pf = StrideCovary::default();
    let _ = feed(&mut pf, &[0, 4, 8, 12]);
    let _ = feed(&mut pf, &[50, 60, 70]);
    assert_eq!(pf.observe(74), vec![78, 82]);

    let issued = feed(&mut pf, &[90, 110, 130]);
    assert!(issued.iter().all(Vec::is_empty));
    assert_eq!(pf.state(), PrefetchState::Prefetching);
}

/// Four consecutive mismatches fall back to Idle, adopting the last stride.
#[test]
fn fourth_mismatch_returns_to_idle() {
    let mut pf = StrideCovary::default();
    let _ = feed(&mut pf, &[0, 4, 8, 12]);
    let _ = feed(&mut pf, &[100, 200, 300, 400]);

    assert_eq!(pf.state(), PrefetchState::Idle);
    assert_eq!(pf.stride(), 100);

    // the adopted stride already counts once
    assert!(pf.observe(500).is_empty());
    assert_eq!(pf.observe(600), vec![700, 800, 900]);
}

// ══════════════════════════════════════════════════════════
// 3. Tuning
// ══════════════════════════════════════════════════════════

#[test]
fn custom_thresholds_and_degrees() {
    let config = PrefetchConfig {
        confirm_threshold: 1,
        initial_degree: 1,
        steady_degree: 3,
        mismatch_tolerance: 0,
        ..PrefetchConfig::default()
    };
    let mut pf = StrideCovary::new(&config);

    assert_eq!(pf.observe(64), vec![128]);
    assert_eq!(pf.observe(128), vec![192, 256, 320]);
    assert!(pf.observe(0).is_empty());
    assert_eq!(pf.state(), PrefetchState::Idle);
    assert_eq!(pf.name(), "stride");
}
