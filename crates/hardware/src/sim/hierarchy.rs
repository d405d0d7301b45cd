//! Cache hierarchy ownership.
//!
//! Levels reference their next level weakly, so something has to keep the chain alive.
//! `Hierarchy` is that owner: it builds the levels bottom-up, handing each one a reference
//! to the level below it (the lowest level gets the backing store), and keeps every level
//! and the store for as long as the hierarchy lives.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::cache::{CacheLevel, NextLevel};
use crate::common::constants::PAGE_SIZE;
use crate::common::error::{CacheError, ConfigError};
use crate::config::{Config, LevelConfig};
use crate::memory::{BackingStore, PagedMemory};
use crate::stats::LevelReport;

/// A chain of cache levels over a paged backing store.
#[derive(Debug)]
pub struct Hierarchy {
    levels: Vec<Rc<RefCell<CacheLevel>>>,
    memory: Rc<RefCell<PagedMemory>>,
    max_block: u32,
}

impl Hierarchy {
    /// Builds the hierarchy described by `levels` (top first) over empty memory.
    ///
    /// Unnamed levels are named `L1`, `L2`, ... by position.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyHierarchy`] for an empty list, or the first invalid
    /// level's error wrapped in [`ConfigError::Level`].
    pub fn new(levels: &[LevelConfig]) -> Result<Self, ConfigError> {
        if levels.is_empty() {
            return Err(ConfigError::EmptyHierarchy);
        }

        let memory = Rc::new(RefCell::new(PagedMemory::new()));
        let mut built: Vec<Rc<RefCell<CacheLevel>>> = Vec::with_capacity(levels.len());
        let mut next = NextLevel::memory(&memory);

        for (i, config) in levels.iter().enumerate().rev() {
            let name = if config.name.is_empty() {
                format!("L{}", i + 1)
            } else {
                config.name.clone()
            };
            let level = CacheLevel::new(name.clone(), config.policy, next, config.write)
                .map_err(|source| ConfigError::Level {
                    level: name,
                    source: Box::new(source),
                })?;
            let level = Rc::new(RefCell::new(level));
            next = NextLevel::cache(&level);
            built.push(level);
        }
        built.reverse();

        let max_block = levels
            .iter()
            .map(|config| config.policy.block_size)
            .max()
            .unwrap_or(1);
        debug!(levels = built.len(), max_block, "cache hierarchy assembled");
        Ok(Self {
            levels: built,
            memory,
            max_block,
        })
    }

    /// Builds the hierarchy of a validated configuration.
    ///
    /// # Errors
    ///
    /// As [`Hierarchy::new`].
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::new(&config.levels)
    }

    /// The level accesses are issued to.
    pub fn top(&self) -> &Rc<RefCell<CacheLevel>> {
        &self.levels[0]
    }

    /// Every level, top first.
    pub fn levels(&self) -> &[Rc<RefCell<CacheLevel>>] {
        &self.levels
    }

    /// Number of cache levels.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// The backing store beneath the lowest level.
    pub const fn memory(&self) -> &Rc<RefCell<PagedMemory>> {
        &self.memory
    }

    /// Largest block size of any level.
    pub const fn max_block_size(&self) -> u32 {
        self.max_block
    }

    /// Allocates every missing page a fill of `addr` can touch.
    ///
    /// That is the page of `addr` plus, when some level's blocks are larger than a page,
    /// every page of the enclosing `max_block_size`-aligned region.
    pub fn ensure_pages(&self, addr: u32) {
        let span = self.max_block.max(PAGE_SIZE);
        let base = u64::from(addr & !(span - 1));
        let mut memory = self.memory.borrow_mut();
        for page in (base..base + u64::from(span)).step_by(PAGE_SIZE as usize) {
            memory.ensure_page(page as u32);
        }
    }

    /// Demand read through the top level.
    ///
    /// # Errors
    ///
    /// Propagates the top level's [`CacheError`].
    pub fn read(&self, addr: u32) -> Result<u8, CacheError> {
        self.top().borrow_mut().read_byte(addr)
    }

    /// Write through the top level.
    ///
    /// # Errors
    ///
    /// Propagates the top level's [`CacheError`].
    pub fn write(&self, addr: u32, value: u8) -> Result<(), CacheError> {
        self.top().borrow_mut().write_byte(addr, value)
    }

    /// Writes every dirty block down to the backing store, top level first.
    ///
    /// Returns the number of blocks written back across all levels.
    ///
    /// # Errors
    ///
    /// Propagates any [`CacheError`] raised during write-back.
    pub fn flush(&self) -> Result<usize, CacheError> {
        let mut flushed = 0;
        for level in &self.levels {
            flushed += level.borrow_mut().flush()?;
        }
        Ok(flushed)
    }

    /// Per-level counter snapshots, top first.
    pub fn level_reports(&self) -> Vec<LevelReport> {
        self.levels
            .iter()
            .map(|level| {
                let level = level.borrow();
                LevelReport::new(level.name(), *level.statistics())
            })
            .collect()
    }
}
