//! Next-Level Traffic Tests.
//!
//! Uses a mock backing store to observe exactly which bytes a level reads and
//! writes below it under each write policy.

use std::cell::RefCell;
use std::rc::Rc;

use memsim_core::cache::{CacheLevel, NextLevel};
use memsim_core::common::CacheError;
use memsim_core::config::WritePolicy;
use mockall::predicate::eq;

use crate::common::harness::{init_tracing, tiny_direct};
use crate::common::mocks::memory::{MockStore, read_only, shared};

fn level_over(store: MockStore, write: WritePolicy) -> (Rc<RefCell<MockStore>>, CacheLevel) {
    init_tracing();
    let store = shared(store);
    let level = CacheLevel::new("L1", tiny_direct(), NextLevel::memory(&store), write).unwrap();
    (store, level)
}

#[test]
fn fill_reads_every_byte_of_the_block() {
    let mut store = MockStore::new();
    for addr in 8..12 {
        let _ = store
            .expect_read_byte()
            .with(eq(addr))
            .times(1)
            .returning(move |a| Ok(a as u8 * 2));
    }
    let _ = store.expect_write_byte().never();
    let (_store, mut cache) = level_over(store, WritePolicy::WRITE_BACK);

    assert_eq!(cache.read_byte(10).unwrap(), 20);
    assert_eq!(cache.read_byte(11).unwrap(), 22);
}

#[test]
fn write_back_writes_whole_victim_once() {
    let mut store = MockStore::new();
    let _ = store.expect_read_byte().times(8).returning(|_| Ok(0));
    let _ = store
        .expect_write_byte()
        .withf(|&addr, &value| addr < 4 && value == if addr == 2 { 0x42 } else { 0 })
        .times(4)
        .returning(|_, _| Ok(()));
    let (_store, mut cache) = level_over(store, WritePolicy::WRITE_BACK);

    cache.write_byte(2, 0x42).unwrap();
    let _ = cache.read_byte(16).unwrap();
}

#[test]
fn write_back_hit_sends_nothing_down() {
    let (_store, mut cache) = level_over(read_only(0), WritePolicy::WRITE_BACK);
    let _ = cache.read_byte(0).unwrap();
    for v in 0..10 {
        cache.write_byte(1, v).unwrap();
    }
}

#[test]
fn write_through_hit_sends_block_down() {
    let mut store = MockStore::new();
    let _ = store.expect_read_byte().times(4).returning(|_| Ok(0));
    let _ = store
        .expect_write_byte()
        .withf(|&addr, &value| addr < 4 && value == if addr == 1 { 9 } else { 0 })
        .times(4)
        .returning(|_, _| Ok(()));
    let (_store, mut cache) = level_over(store, WritePolicy::WRITE_THROUGH);

    let _ = cache.read_byte(0).unwrap();
    cache.write_byte(1, 9).unwrap();
}

#[test]
fn no_write_allocate_miss_forwards_single_byte() {
    let mut store = MockStore::new();
    let _ = store.expect_read_byte().never();
    let _ = store
        .expect_write_byte()
        .with(eq(7), eq(3))
        .times(1)
        .returning(|_, _| Ok(()));
    let (_store, mut cache) = level_over(store, WritePolicy::new(true, false));

    cache.write_byte(7, 3).unwrap();
}

#[test]
fn store_failure_propagates() {
    let mut store = MockStore::new();
    let _ = store
        .expect_read_byte()
        .returning(|addr| Err(CacheError::PageNotAllocated { addr }));
    let (_store, mut cache) = level_over(store, WritePolicy::WRITE_BACK);

    assert_eq!(
        cache.read_byte(0x21).unwrap_err(),
        CacheError::PageNotAllocated { addr: 0x20 }
    );
    assert!(!cache.contains(0x21).unwrap());
}
