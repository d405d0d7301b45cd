//! Trace-driven simulator.
//!
//! The simulator owns a hierarchy and an optional prefetch controller. For every trace
//! record it allocates the backing pages its fills can touch, issues the demand access to
//! the top level, then lets the controller observe the address and issues its predictions
//! as prefetch reads.
//! Page allocation happens here, never inside the cache engine.

use std::path::Path;

use serde::Serialize;
use tracing::{info, trace};

use super::hierarchy::Hierarchy;
use crate::common::data::AccessType;
use crate::common::error::{CacheError, ConfigError, SimError};
use crate::config::Config;
use crate::prefetch::{Prefetcher, StrideCovary};
use crate::stats::LevelReport;
use crate::trace::{TraceReader, TraceRecord};

/// Counts of what a run issued.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Trace records replayed.
    pub records: u64,
    /// Demand reads issued.
    pub reads: u64,
    /// Demand writes issued.
    pub writes: u64,
    /// Prefetch reads issued (targets already resident in the top level are not counted).
    pub prefetches_issued: u64,
}

/// Replays traces against a cache hierarchy.
#[derive(Debug)]
pub struct Simulator {
    hierarchy: Hierarchy,
    prefetcher: Option<Box<dyn Prefetcher>>,
    summary: RunSummary,
}

impl Simulator {
    /// Builds the hierarchy and prefetch controller described by `config`.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let hierarchy = Hierarchy::from_config(config)?;
        let prefetcher: Option<Box<dyn Prefetcher>> = if config.prefetch.enabled {
            Some(Box::new(StrideCovary::new(&config.prefetch)))
        } else {
            None
        };
        Ok(Self::with_parts(hierarchy, prefetcher))
    }

    /// Wraps an existing hierarchy and controller.
    pub fn with_parts(hierarchy: Hierarchy, prefetcher: Option<Box<dyn Prefetcher>>) -> Self {
        Self {
            hierarchy,
            prefetcher,
            summary: RunSummary::default(),
        }
    }

    /// The simulated hierarchy.
    pub const fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// Returns `true` if a prefetch controller is attached.
    pub const fn prefetch_enabled(&self) -> bool {
        self.prefetcher.is_some()
    }

    /// Totals accumulated since construction.
    pub const fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Replays one record.
    ///
    /// Writes store the value zero.
    ///
    /// # Errors
    ///
    /// Propagates any [`CacheError`]; the hierarchy is not usable afterwards.
    pub fn step(&mut self, record: TraceRecord) -> Result<(), CacheError> {
        let addr = record.addr;
        self.hierarchy.ensure_pages(addr);

        match record.op {
            AccessType::Read => {
                let _ = self.hierarchy.read(addr)?;
                self.summary.reads += 1;
            }
            AccessType::Write => {
                self.hierarchy.write(addr, 0)?;
                self.summary.writes += 1;
            }
        }
        self.summary.records += 1;

        let Some(prefetcher) = self.prefetcher.as_mut() else {
            return Ok(());
        };
        for target in prefetcher.observe(addr) {
            let top = self.hierarchy.top();
            if top.borrow().contains(target)? {
                continue;
            }
            self.hierarchy.ensure_pages(target);
            let _ = top.borrow_mut().prefetch_byte(target)?;
            self.summary.prefetches_issued += 1;
            trace!(
                addr = format_args!("{target:#010x}"),
                controller = prefetcher.name(),
                "prefetch issued"
            );
        }
        Ok(())
    }

    /// Replays `records` in order.
    ///
    /// Returns the totals of this call only.
    ///
    /// # Errors
    ///
    /// Stops at the first [`CacheError`].
    pub fn run(&mut self, records: &[TraceRecord]) -> Result<RunSummary, SimError> {
        let before = self.summary;
        info!(
            records = records.len(),
            levels = self.hierarchy.depth(),
            prefetch = self.prefetch_enabled(),
            "simulation started"
        );

        for &record in records {
            self.step(record)?;
        }

        let run = RunSummary {
            records: self.summary.records - before.records,
            reads: self.summary.reads - before.reads,
            writes: self.summary.writes - before.writes,
            prefetches_issued: self.summary.prefetches_issued - before.prefetches_issued,
        };
        info!(
            records = run.records,
            reads = run.reads,
            writes = run.writes,
            prefetches = run.prefetches_issued,
            "simulation finished"
        );
        Ok(run)
    }

    /// Reads the trace at `path` and replays it.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Trace`] for unreadable or malformed traces, otherwise as
    /// [`Simulator::run`].
    pub fn run_file(&mut self, path: impl AsRef<Path>) -> Result<RunSummary, SimError> {
        let reader = TraceReader::from_path(path)?;
        self.run(reader.records())
    }

    /// Statistics of the top level followed by every lower level.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::DetachedLevel`] if a level has been dropped.
    pub fn statistics_report(&self) -> Result<String, CacheError> {
        self.hierarchy.top().borrow().statistics_report()
    }

    /// Configuration of every level, with per-block state when `verbose`.
    pub fn info_report(&self, verbose: bool) -> String {
        self.hierarchy
            .levels()
            .iter()
            .map(|level| level.borrow().info(verbose))
            .collect()
    }

    /// Per-level counter snapshots, top first.
    pub fn level_reports(&self) -> Vec<LevelReport> {
        self.hierarchy.level_reports()
    }
}
