//! Simulator Tests.
//!
//! Trace replay through the reference hierarchy, prefetch issue, page
//! allocation by the driver, and error reporting.

use std::io::Write;

use memsim_core::common::{ConfigError, SimError, TraceError};
use memsim_core::config::{Config, LevelConfig, Policy, PrefetchConfig, WritePolicy};
use memsim_core::prefetch::Prefetcher;
use memsim_core::sim::{Hierarchy, RunSummary, Simulator};
use memsim_core::trace::{TraceRecord, parse_trace};
use pretty_assertions::assert_eq;

use crate::common::harness::init_tracing;

fn simulator(prefetch: bool) -> Simulator {
    init_tracing();
    let config = Config {
        prefetch: if prefetch {
            PrefetchConfig::default()
        } else {
            PrefetchConfig::disabled()
        },
        ..Config::default()
    };
    Simulator::new(&config).unwrap()
}

/// Returns the same targets for every access.
#[derive(Debug)]
struct FixedTargets(Vec<u32>);

impl Prefetcher for FixedTargets {
    fn observe(&mut self, _addr: u32) -> Vec<u32> {
        self.0.clone()
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

const STRIDED: &str = "r 0\nr 40\nr 80\nr c0\nr 100\n";

// ══════════════════════════════════════════════════════════
// 1. Replay
// ══════════════════════════════════════════════════════════

#[test]
fn strided_trace_without_prefetch_always_misses() {
    let mut sim = simulator(false);
    let summary = sim.run(&parse_trace(STRIDED).unwrap()).unwrap();

    assert_eq!(
        summary,
        RunSummary {
            records: 5,
            reads: 5,
            writes: 0,
            prefetches_issued: 0,
        }
    );
    let l1 = sim.level_reports()[0].statistics;
    assert_eq!((l1.num_read, l1.num_hit, l1.num_miss), (5, 0, 5));
}

/// After 0x0, 0x40, 0x80, 0xc0 the controller fetches 0x100 ahead of its demand read.
#[test]
fn strided_trace_with_prefetch_hits_ahead() {
    let mut sim = simulator(true);
    let summary = sim.run(&parse_trace(STRIDED).unwrap()).unwrap();

    assert_eq!(summary.prefetches_issued, 3);
    let l1 = sim.level_reports()[0].statistics;
    assert_eq!((l1.num_read, l1.num_hit, l1.num_miss), (5, 1, 4));
}

#[test]
fn writes_store_zero_and_count() {
    let mut sim = simulator(false);
    let summary = sim
        .run(&[TraceRecord::write(8), TraceRecord::read(8)])
        .unwrap();

    assert_eq!((summary.reads, summary.writes), (1, 1));
    let l1 = sim.level_reports()[0].statistics;
    assert_eq!((l1.num_write, l1.num_read, l1.num_hit), (1, 1, 1));
    assert_eq!(sim.hierarchy().read(8).unwrap(), 0);
}

#[test]
fn summaries_are_per_run_and_cumulative() {
    let mut sim = simulator(false);
    let first = sim.run(&[TraceRecord::read(0)]).unwrap();
    let second = sim.run(&[TraceRecord::read(0), TraceRecord::write(4)]).unwrap();

    assert_eq!(first.records, 1);
    assert_eq!(second.records, 2);
    assert_eq!(sim.summary().records, 3);
    assert_eq!(sim.summary().writes, 1);
}

#[test]
fn blocks_larger_than_a_page_replay() {
    init_tracing();
    let config = Config {
        levels: vec![LevelConfig::new(
            "L1",
            Policy::new(64 * 1024, 8192, 2, 1, 10),
            WritePolicy::WRITE_BACK,
        )],
        prefetch: PrefetchConfig::disabled(),
    };
    let mut sim = Simulator::new(&config).unwrap();
    let summary = sim
        .run(&[TraceRecord::read(0), TraceRecord::write(0x3000), TraceRecord::read(0x3001)])
        .unwrap();

    assert_eq!(summary.records, 3);
    assert_eq!(sim.hierarchy().max_block_size(), 8192);
    assert_eq!(sim.hierarchy().memory().borrow().page_count(), 4);
    let l1 = sim.level_reports()[0].statistics;
    assert_eq!((l1.num_hit, l1.num_miss), (1, 2));
}

// ══════════════════════════════════════════════════════════
// 2. Prefetch issue
// ══════════════════════════════════════════════════════════

#[test]
fn driver_allocates_pages_for_prefetch_targets() {
    let mut sim = simulator(true);
    let trace = parse_trace("r f00 r f40 r f80 r fc0").unwrap();
    let summary = sim.run(&trace).unwrap();

    assert_eq!(summary.prefetches_issued, 3);
    assert_eq!(sim.hierarchy().memory().borrow().page_count(), 2);
    assert!(sim.hierarchy().top().borrow().contains(0x1080).unwrap());
}

#[test]
fn resident_targets_are_skipped() {
    let hierarchy = Hierarchy::from_config(&Config::default()).unwrap();
    let mut sim = Simulator::with_parts(hierarchy, Some(Box::new(FixedTargets(vec![0x3f, 0x40]))));

    sim.step(TraceRecord::read(0)).unwrap();
    assert_eq!(sim.summary().prefetches_issued, 1);

    sim.step(TraceRecord::read(0)).unwrap();
    assert_eq!(sim.summary().prefetches_issued, 1);

    let l1 = sim.level_reports()[0].statistics;
    assert_eq!((l1.num_read, l1.num_hit, l1.num_miss), (2, 1, 1));
}

#[test]
fn disabled_prefetch_has_no_controller() {
    assert!(!simulator(false).prefetch_enabled());
    assert!(simulator(true).prefetch_enabled());
}

// ══════════════════════════════════════════════════════════
// 3. Files and errors
// ══════════════════════════════════════════════════════════

#[test]
fn run_file_replays_trace() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "r 0x10\nw 0x10\nr 0x10").unwrap();

    let mut sim = simulator(false);
    let summary = sim.run_file(file.path()).unwrap();
    assert_eq!((summary.records, summary.reads, summary.writes), (3, 2, 1));
}

#[test]
fn malformed_trace_aborts_before_replay() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "r 0 x 4").unwrap();

    let mut sim = simulator(false);
    match sim.run_file(file.path()) {
        Err(SimError::Trace(TraceError::IllegalOp { record, token })) => {
            assert_eq!(record, 1);
            assert_eq!(token, "x");
        }
        other => panic!("expected illegal op, got {other:?}"),
    }
    assert_eq!(sim.summary(), RunSummary::default());
}

#[test]
fn missing_trace_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut sim = simulator(false);
    let err = sim.run_file(dir.path().join("none.trace")).unwrap_err();
    assert!(matches!(err, SimError::Trace(TraceError::Io(_))));
}

#[test]
fn invalid_config_is_rejected() {
    let mut config = Config::default();
    config.levels[1].policy.associativity = 3;
    let err = Simulator::new(&config).unwrap_err();
    assert!(matches!(err, ConfigError::Level { ref level, .. } if level == "L2"));
}
