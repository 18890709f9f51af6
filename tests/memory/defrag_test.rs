/*!
 * Defragmenter Tests
 * Compaction ordering, offset recomputation, and free-tail coalescing
 */

use crate::common::{assert_well_formed, layout};
use memsim::{Journal, JournalEvent, MemoryManager, PlacementPolicy};
use pretty_assertions::assert_eq;
use std::sync::Arc;

#[test]
fn test_compact_packs_allocated_before_free() {
    let manager = MemoryManager::with_capacity(50);
    let a = manager.allocate(10, PlacementPolicy::FirstFit, 1).unwrap();
    let b = manager.allocate(10, PlacementPolicy::FirstFit, 2).unwrap();
    let c = manager.allocate(10, PlacementPolicy::FirstFit, 3).unwrap();
    manager.release(b).unwrap();

    let stats = manager.compact();

    // a and c keep their relative order; all free capacity is one tail block
    assert_eq!(
        layout(&manager.snapshot()),
        vec![(0, 10, false), (10, 10, false), (20, 30, true)]
    );
    assert_eq!(stats.moved, 2);
    assert_eq!(stats.merged_free, 1);

    // handles survive the move: ids are stable even though offsets changed
    assert_eq!(manager.handle_size(a), Some(10));
    assert_eq!(manager.handle_size(c), Some(10));
    let snapshot = manager.snapshot();
    let moved_c = snapshot.iter().find(|blk| blk.id == c.id()).unwrap();
    assert_eq!(moved_c.start, 10);
}

#[test]
fn test_compact_preserves_totals() {
    let manager = MemoryManager::with_capacity(50);
    let a = manager.allocate(7, PlacementPolicy::FirstFit, 1).unwrap();
    manager.allocate(9, PlacementPolicy::FirstFit, 2).unwrap();
    let c = manager.allocate(11, PlacementPolicy::FirstFit, 3).unwrap();
    manager.release(a).unwrap();
    manager.release(c).unwrap();

    let (_, used_before, available_before) = manager.info();
    manager.compact();
    let (_, used_after, available_after) = manager.info();

    assert_eq!(used_before, used_after);
    assert_eq!(available_before, available_after);
    assert_well_formed(&manager.snapshot(), 50);
}

#[test]
fn test_compact_on_fresh_ledger_is_a_noop() {
    let manager = MemoryManager::with_capacity(50);
    let stats = manager.compact();
    assert_eq!((stats.moved, stats.merged_free), (0, 0));
    assert_eq!(layout(&manager.snapshot()), vec![(0, 50, true)]);
}

#[test]
fn test_compact_with_no_free_capacity() {
    let manager = MemoryManager::with_capacity(30);
    manager.allocate(10, PlacementPolicy::FirstFit, 1).unwrap();
    manager.allocate(10, PlacementPolicy::FirstFit, 2).unwrap();
    manager.allocate(10, PlacementPolicy::FirstFit, 3).unwrap();

    let stats = manager.compact();
    assert_eq!((stats.moved, stats.merged_free), (0, 0));
    assert_well_formed(&manager.snapshot(), 30);
}

#[test]
fn test_release_after_compact_coalesces_with_tail() {
    let manager = MemoryManager::with_capacity(50);
    let a = manager.allocate(10, PlacementPolicy::FirstFit, 1).unwrap();
    let b = manager.allocate(10, PlacementPolicy::FirstFit, 2).unwrap();
    manager.release(a).unwrap();
    manager.compact();

    // b is now the last allocated block, flush against the free tail
    manager.release(b).unwrap();
    assert_eq!(layout(&manager.snapshot()), vec![(0, 50, true)]);
}

#[test]
fn test_compact_emits_journal_record() {
    let journal = Arc::new(Journal::new());
    let manager = MemoryManager::with_capacity(50).with_journal(Arc::clone(&journal));
    let a = manager.allocate(10, PlacementPolicy::FirstFit, 1).unwrap();
    manager.allocate(10, PlacementPolicy::FirstFit, 2).unwrap();
    manager.release(a).unwrap();

    manager.compact();

    let events = journal.events();
    assert_eq!(
        events.last().unwrap(),
        &JournalEvent::Defragmented {
            moved: 2,
            merged_free: 1,
        }
    );
    let last = journal.records().pop().unwrap();
    assert_well_formed(&last.blocks, 50);
}
