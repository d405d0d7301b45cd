//! Set-Associative Cache Level.
//!
//! This module implements one level of a byte-granular cache hierarchy. A level decodes
//! addresses into tag/set/offset, searches the `associativity` blocks of the target set,
//! and on a miss fills the block from its next level (another `CacheLevel` or the backing
//! store), evicting the least recently used block and writing it back when dirty.
//!
//! Levels are chained through [`NextLevel`], a non-owning reference: whoever assembles the
//! hierarchy owns every level and the backing store, and each next level must outlive the
//! level above it. A dangling reference is reported as [`CacheError::DetachedLevel`].

/// Cache block state.
pub mod block;

/// Cache replacement policy implementations.
pub mod policies;

pub use self::block::Block;
pub use self::policies::{LruPolicy, ReplacementPolicy};

use std::cell::RefCell;
use std::ops::Range;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use crate::common::addr::AddressLayout;
use crate::common::data::AccessKind;
use crate::common::error::{CacheError, ConfigError};
use crate::config::{Policy, WritePolicy};
use crate::memory::BackingStore;
use crate::stats::{LevelReport, Statistics};

/// Where a level delegates misses, write-backs, and bypassed writes.
#[derive(Debug, Clone)]
pub enum NextLevel {
    /// Another cache level.
    Cache(Weak<RefCell<CacheLevel>>),
    /// The backing store; this is the lowest cache level.
    Memory(Weak<RefCell<dyn BackingStore>>),
}

impl NextLevel {
    /// Delegates to `level`.
    pub fn cache(level: &Rc<RefCell<CacheLevel>>) -> Self {
        Self::Cache(Rc::downgrade(level))
    }

    /// Delegates directly to `memory`.
    pub fn memory<M: BackingStore + 'static>(memory: &Rc<RefCell<M>>) -> Self {
        let weak: Weak<RefCell<M>> = Rc::downgrade(memory);
        Self::Memory(weak)
    }

    /// Returns `true` when delegation goes straight to the backing store.
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory(_))
    }
}

/// One set-associative cache level.
///
/// Every access, including prefetch reads, increments the level's reference counter and
/// stamps the touched block, giving the total order LRU replacement relies on.
#[derive(Debug)]
pub struct CacheLevel {
    name: String,
    policy: Policy,
    write: WritePolicy,
    layout: AddressLayout,
    blocks: Vec<Block>,
    next: NextLevel,
    replacement: Box<dyn ReplacementPolicy>,
    reference_counter: u64,
    statistics: Statistics,
}

impl CacheLevel {
    /// Creates a level with all blocks invalid.
    ///
    /// # Arguments
    ///
    /// * `name` - Display name used in reports and logs.
    /// * `policy` - Geometry and latencies; validated here.
    /// * `next` - Level (or backing store) that services this level's misses.
    /// * `write` - Write-back/write-through and write-allocate/no-write-allocate flags.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] of the first violated policy invariant; no level is built.
    pub fn new(
        name: impl Into<String>,
        policy: Policy,
        next: NextLevel,
        write: WritePolicy,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        policy.validate()?;
        let num_sets = policy.num_sets();
        let layout = AddressLayout::new(policy.block_size, num_sets)?;

        let blocks = (0..policy.block_num)
            .map(|i| Block::empty(i / policy.associativity, policy.block_size))
            .collect();

        debug!(
            level = %name,
            size = policy.cache_size,
            block = policy.block_size,
            ways = policy.associativity,
            sets = num_sets,
            write_back = write.write_back,
            write_allocate = write.write_allocate,
            "cache level constructed"
        );

        Ok(Self {
            name,
            policy,
            write,
            layout,
            blocks,
            next,
            replacement: Box::new(LruPolicy::new()),
            reference_counter: 0,
            statistics: Statistics::default(),
        })
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Geometry and latencies.
    pub const fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Write hit/miss behaviour.
    pub const fn write_policy(&self) -> WritePolicy {
        self.write
    }

    /// Address decomposition used by this level.
    pub const fn layout(&self) -> &AddressLayout {
        &self.layout
    }

    /// Live counters.
    pub const fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Current reference-counter value.
    pub const fn reference_counter(&self) -> u64 {
        self.reference_counter
    }

    /// All blocks in slot order; set `s` occupies slots `s*ways .. (s+1)*ways`.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// The blocks of set `set`, or `None` if the level has no such set.
    pub fn set(&self, set: u32) -> Option<&[Block]> {
        self.blocks.get(self.set_range(set))
    }

    /// Next-level reference.
    pub const fn next_level(&self) -> &NextLevel {
        &self.next
    }

    /// Returns `true` if the block holding `addr` is resident.
    ///
    /// Does not touch statistics or the reference counter.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::SetIdMismatch`] if the target set is corrupted.
    pub fn contains(&self, addr: u32) -> Result<bool, CacheError> {
        Ok(self.locate(addr)?.is_some())
    }

    /// Finds the slot holding `addr`'s block.
    ///
    /// Scans exactly the `associativity` blocks of the target set.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::SetIdMismatch`] if a scanned block records a different set id
    /// than the one computed from `addr`.
    pub fn locate(&self, addr: u32) -> Result<Option<usize>, CacheError> {
        let decoded = self.layout.decompose(addr);
        for slot in self.set_range(decoded.set) {
            let block = &self.blocks[slot];
            if block.set_id != decoded.set {
                return Err(CacheError::SetIdMismatch {
                    slot,
                    expected: decoded.set,
                    found: block.set_id,
                });
            }
            if block.valid && block.tag == decoded.tag {
                return Ok(Some(slot));
            }
        }
        Ok(None)
    }

    /// Demand read of one byte.
    ///
    /// # Errors
    ///
    /// Propagates any [`CacheError`] raised here or by a lower level.
    pub fn read_byte(&mut self, addr: u32) -> Result<u8, CacheError> {
        self.read_byte_as(addr, AccessKind::Demand)
    }

    /// Speculative read of one byte on behalf of the prefetch controller.
    ///
    /// # Errors
    ///
    /// Propagates any [`CacheError`] raised here or by a lower level.
    pub fn prefetch_byte(&mut self, addr: u32) -> Result<u8, CacheError> {
        self.read_byte_as(addr, AccessKind::Prefetch)
    }

    /// Reads one byte, filling its block from the next level on a miss.
    ///
    /// Demand reads count towards `num_read`; prefetch reads do not, and a prefetch miss
    /// records neither `num_miss` nor miss latency. A hit records `num_hit` and the hit
    /// latency for both kinds. The fill is issued to the next level with the same kind.
    ///
    /// # Errors
    ///
    /// Propagates any [`CacheError`] raised here or by a lower level;
    /// [`CacheError::NotResidentAfterFill`] if the block vanished after installation.
    pub fn read_byte_as(&mut self, addr: u32, kind: AccessKind) -> Result<u8, CacheError> {
        self.reference_counter += 1;
        if !kind.is_prefetch() {
            self.statistics.num_read += 1;
        }

        let offset = self.layout.offset(addr) as usize;
        if let Some(slot) = self.locate(addr)? {
            self.statistics.record_hit(self.policy.hit_latency);
            let block = &mut self.blocks[slot];
            block.last_reference = self.reference_counter;
            return Ok(block.data[offset]);
        }

        if !kind.is_prefetch() {
            self.statistics.record_miss(self.policy.miss_latency);
        }

        self.fill(addr, kind)?;
        let slot = self.resident_slot(addr)?;
        let block = &mut self.blocks[slot];
        block.last_reference = self.reference_counter;
        Ok(block.data[offset])
    }

    /// Writes one byte.
    ///
    /// A hit marks the block modified; under write-through the whole block is then
    /// propagated to the next level at the cost of `miss_latency`. A miss under
    /// write-allocate fills the block and writes the byte into it without propagating;
    /// under no-write-allocate the byte goes straight to the next level.
    ///
    /// # Errors
    ///
    /// Propagates any [`CacheError`] raised here or by a lower level.
    pub fn write_byte(&mut self, addr: u32, value: u8) -> Result<(), CacheError> {
        self.reference_counter += 1;
        self.statistics.num_write += 1;

        if let Some(slot) = self.locate(addr)? {
            self.statistics.record_hit(self.policy.hit_latency);
            self.store(slot, addr, value)?;
            return Ok(());
        }

        self.statistics.record_miss(self.policy.miss_latency);

        if self.write.write_allocate {
            self.fill(addr, AccessKind::Demand)?;
            let slot = self.resident_slot(addr)?;
            self.write_resident(slot, addr, value);
            Ok(())
        } else {
            self.next_write(addr, value)
        }
    }

    /// Writes every dirty block back to the next level and marks it clean.
    ///
    /// Blocks stay valid. Returns the number of blocks written back.
    ///
    /// # Errors
    ///
    /// Propagates any [`CacheError`] raised by the next level.
    pub fn flush(&mut self) -> Result<usize, CacheError> {
        let mut flushed = 0;
        for slot in 0..self.blocks.len() {
            if self.blocks[slot].is_dirty() {
                self.flush_block(slot)?;
                self.blocks[slot].modified = false;
                flushed += 1;
            }
        }
        Ok(flushed)
    }

    /// Renders the static configuration, and with `verbose` the state of every block.
    pub fn info(&self, verbose: bool) -> String {
        let mut out = format!(
            "---------- Cache Info ({}) -----------\n\
             Cache Size: {} bytes\n\
             Block Size: {} bytes\n\
             Block Num: {}\n\
             Associativity: {}\n\
             Hit Latency: {} cycles\n\
             Miss Latency: {} cycles\n\
             Write Policy: {}, {}\n\
             Replacement: {}\n",
            self.name,
            self.policy.cache_size,
            self.policy.block_size,
            self.policy.block_num,
            self.policy.associativity,
            self.policy.hit_latency,
            self.policy.miss_latency,
            if self.write.write_back {
                "write-back"
            } else {
                "write-through"
            },
            if self.write.write_allocate {
                "write-allocate"
            } else {
                "no-write-allocate"
            },
            self.replacement.name(),
        );
        if verbose {
            for (slot, b) in self.blocks.iter().enumerate() {
                out.push_str(&format!(
                    "Block {}: tag {:#x} id {} {} {} (last ref {})\n",
                    slot,
                    b.tag,
                    b.set_id,
                    if b.valid { "valid" } else { "invalid" },
                    if b.modified { "modified" } else { "unmodified" },
                    b.last_reference
                ));
            }
        }
        out
    }

    /// Renders this level's statistics followed by every lower level's.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::DetachedLevel`] if a lower level no longer exists.
    pub fn statistics_report(&self) -> Result<String, CacheError> {
        let mut out = format!(
            "-------- STATISTICS ({}) ----------\n{}",
            self.name, self.statistics
        );
        if let NextLevel::Cache(weak) = &self.next {
            let lower = self.attached(weak)?;
            let lower_report = lower.borrow().statistics_report()?;
            out.push_str("---------- LOWER CACHE ----------\n");
            out.push_str(&lower_report);
        }
        Ok(out)
    }

    /// Snapshots of this level's counters followed by every lower level's.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::DetachedLevel`] if a lower level no longer exists.
    pub fn level_reports(&self) -> Result<Vec<LevelReport>, CacheError> {
        let mut reports = vec![LevelReport::new(self.name.clone(), self.statistics)];
        if let NextLevel::Cache(weak) = &self.next {
            let lower = self.attached(weak)?;
            let lower_reports = lower.borrow().level_reports()?;
            reports.extend(lower_reports);
        }
        Ok(reports)
    }

    fn set_range(&self, set: u32) -> Range<usize> {
        let ways = self.policy.associativity as usize;
        let start = set as usize * ways;
        start..start + ways
    }

    fn resident_slot(&self, addr: u32) -> Result<usize, CacheError> {
        self.locate(addr)?
            .ok_or(CacheError::NotResidentAfterFill { addr })
    }

    /// Write hit: updates the block, propagating it under write-through.
    fn store(&mut self, slot: usize, addr: u32, value: u8) -> Result<(), CacheError> {
        self.write_resident(slot, addr, value);
        if !self.write.write_back {
            self.flush_block(slot)?;
            self.statistics.charge(self.policy.miss_latency);
        }
        Ok(())
    }

    fn write_resident(&mut self, slot: usize, addr: u32, value: u8) {
        let offset = self.layout.offset(addr) as usize;
        let block = &mut self.blocks[slot];
        block.modified = true;
        block.last_reference = self.reference_counter;
        block.data[offset] = value;
    }

    /// Loads `addr`'s block from the next level and installs it over the LRU victim.
    ///
    /// The whole block is fetched first, byte by byte, then the victim is chosen and,
    /// if dirty under write-back, written back at the cost of `miss_latency`.
    fn fill(&mut self, addr: u32, kind: AccessKind) -> Result<(), CacheError> {
        let decoded = self.layout.decompose(addr);
        let base = self.layout.block_base(addr);

        let mut data = vec![0u8; self.policy.block_size as usize];
        for (i, byte) in data.iter_mut().enumerate() {
            *byte = self.next_read(base + i as u32, kind)?;
        }

        let range = self.set_range(decoded.set);
        let slot = range.start + self.replacement.select_victim(&self.blocks[range]);

        if self.write.write_back && self.blocks[slot].is_dirty() {
            trace!(
                level = %self.name,
                slot,
                victim = format_args!("{:#010x}", self.victim_base(slot)),
                "writing back dirty victim"
            );
            self.flush_block(slot)?;
            self.statistics.charge(self.policy.miss_latency);
        } else if self.blocks[slot].valid {
            trace!(
                level = %self.name,
                slot,
                victim = format_args!("{:#010x}", self.victim_base(slot)),
                "evicting clean victim"
            );
        }

        self.blocks[slot] = Block::filled(decoded.tag, decoded.set, self.reference_counter, data);
        Ok(())
    }

    fn victim_base(&self, slot: usize) -> u32 {
        let block = &self.blocks[slot];
        self.layout.base_address(block.tag, block.set_id)
    }

    /// Writes the full contents of the block in `slot` to the next level.
    fn flush_block(&self, slot: usize) -> Result<(), CacheError> {
        let block = &self.blocks[slot];
        let base = self.layout.base_address(block.tag, block.set_id);
        for (i, &byte) in block.data.iter().enumerate() {
            self.next_write(base + i as u32, byte)?;
        }
        Ok(())
    }

    fn attached<T: ?Sized>(&self, weak: &Weak<T>) -> Result<Rc<T>, CacheError> {
        weak.upgrade().ok_or_else(|| CacheError::DetachedLevel {
            level: self.name.clone(),
        })
    }

    fn next_read(&self, addr: u32, kind: AccessKind) -> Result<u8, CacheError> {
        match &self.next {
            NextLevel::Cache(weak) => {
                let lower = self.attached(weak)?;
                let value = lower.borrow_mut().read_byte_as(addr, kind)?;
                Ok(value)
            }
            NextLevel::Memory(weak) => {
                let memory = self.attached(weak)?;
                let value = memory.borrow_mut().read_byte(addr)?;
                Ok(value)
            }
        }
    }

    fn next_write(&self, addr: u32, value: u8) -> Result<(), CacheError> {
        match &self.next {
            NextLevel::Cache(weak) => {
                let lower = self.attached(weak)?;
                lower.borrow_mut().write_byte(addr, value)?;
                Ok(())
            }
            NextLevel::Memory(weak) => {
                let memory = self.attached(weak)?;
                memory.borrow_mut().write_byte(addr, value)?;
                Ok(())
            }
        }
    }
}
