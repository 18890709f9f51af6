/*!
 * Allocation Manager Tests
 * Allocate, release, coalescing, error handling, and journal ordering
 */

use crate::common::{assert_well_formed, layout};
use memsim::{
    Allocator, Journal, MemoryError, MemoryManager, PlacementPolicy,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

#[test]
fn test_first_fit_alloc_then_release_restores_space() {
    let manager = MemoryManager::with_capacity(50);

    let handle = manager
        .allocate(10, PlacementPolicy::FirstFit, 1)
        .unwrap();
    assert_eq!(
        layout(&manager.snapshot()),
        vec![(0, 10, false), (10, 40, true)]
    );

    manager.release(handle).unwrap();
    assert_eq!(layout(&manager.snapshot()), vec![(0, 50, true)]);
}

#[test]
fn test_best_fit_chooses_the_only_candidate() {
    let manager = MemoryManager::with_capacity(50);

    manager.allocate(20, PlacementPolicy::FirstFit, 1).unwrap();
    manager.allocate(10, PlacementPolicy::BestFit, 2).unwrap();

    assert_eq!(
        layout(&manager.snapshot()),
        vec![(0, 20, false), (20, 10, false), (30, 20, true)]
    );
}

#[test]
fn test_oversized_request_leaves_ledger_unchanged() {
    let manager = MemoryManager::with_capacity(50);
    manager.allocate(20, PlacementPolicy::FirstFit, 1).unwrap();
    let before = manager.snapshot();

    let result = manager.allocate(60, PlacementPolicy::FirstFit, 2);
    assert_eq!(
        result,
        Err(MemoryError::OutOfMemory {
            requested: 60,
            largest_free: 30,
            total_free: 30,
        })
    );

    // byte-for-byte unchanged, ids included
    assert_eq!(manager.snapshot(), before);
}

#[test]
fn test_fragmented_space_can_deny_despite_enough_total() {
    let manager = MemoryManager::with_capacity(30);
    let a = manager.allocate(10, PlacementPolicy::FirstFit, 1).unwrap();
    manager.allocate(10, PlacementPolicy::FirstFit, 2).unwrap();
    manager.allocate(10, PlacementPolicy::FirstFit, 3).unwrap();
    manager.release(a).unwrap();
    // 10 free at the front, 0 at the back: 10 total free but no block of 11
    let err = manager
        .allocate(11, PlacementPolicy::FirstFit, 4)
        .unwrap_err();
    assert_eq!(
        err,
        MemoryError::OutOfMemory {
            requested: 11,
            largest_free: 10,
            total_free: 10,
        }
    );
}

#[test]
fn test_release_order_independence() {
    let run = |release_first_then_third: bool| {
        let manager = MemoryManager::with_capacity(50);
        let first = manager.allocate(10, PlacementPolicy::FirstFit, 1).unwrap();
        let _middle = manager.allocate(10, PlacementPolicy::FirstFit, 2).unwrap();
        let third = manager.allocate(10, PlacementPolicy::FirstFit, 3).unwrap();

        if release_first_then_third {
            manager.release(first).unwrap();
            manager.release(third).unwrap();
        } else {
            manager.release(third).unwrap();
            manager.release(first).unwrap();
        }
        layout(&manager.snapshot())
    };

    let forward = run(true);
    let backward = run(false);
    assert_eq!(forward, backward);
    assert_eq!(
        forward,
        vec![(0, 10, true), (10, 10, false), (20, 30, true)]
    );
}

#[test]
fn test_round_trip_restores_layout() {
    let manager = MemoryManager::with_capacity(50);
    let before = layout(&manager.snapshot());

    let handle = manager.allocate(17, PlacementPolicy::BestFit, 1).unwrap();
    manager.release(handle).unwrap();

    assert_eq!(layout(&manager.snapshot()), before);
    let (_, used, available) = manager.info();
    assert_eq!((used, available), (0, 50));
}

#[test]
fn test_zero_size_request_rejected() {
    let manager = MemoryManager::with_capacity(50);
    let before = manager.snapshot();

    let result = manager.allocate(0, PlacementPolicy::FirstFit, 1);
    assert_eq!(result, Err(MemoryError::InvalidRequest { size: 0 }));
    assert_eq!(manager.snapshot(), before);
}

#[test]
fn test_double_release_is_unknown_handle() {
    let manager = MemoryManager::with_capacity(50);
    let handle = manager.allocate(10, PlacementPolicy::FirstFit, 1).unwrap();

    assert!(manager.is_live(handle));
    manager.release(handle).unwrap();
    assert!(!manager.is_live(handle));

    let result = manager.release(handle);
    assert!(matches!(result, Err(MemoryError::UnknownHandle(_))));
}

#[test]
fn test_handles_survive_unrelated_churn() {
    let manager = MemoryManager::with_capacity(50);
    let a = manager.allocate(5, PlacementPolicy::FirstFit, 1).unwrap();
    let b = manager.allocate(5, PlacementPolicy::FirstFit, 2).unwrap();
    let c = manager.allocate(5, PlacementPolicy::FirstFit, 3).unwrap();

    // split and merge on both sides of b
    manager.release(a).unwrap();
    manager.release(c).unwrap();
    manager.allocate(3, PlacementPolicy::FirstFit, 4).unwrap();

    assert!(manager.is_live(b));
    assert_eq!(manager.handle_size(b), Some(5));
    let snapshot = manager.snapshot();
    let block = snapshot.iter().find(|blk| blk.id == b.id()).unwrap();
    assert_eq!((block.start, block.size, block.free), (5, 5, false));
    assert_well_formed(&snapshot, 50);
}

#[test]
fn test_job_tracking() {
    let manager = MemoryManager::with_capacity(50);
    let job = 7;

    let first = manager.allocate(10, PlacementPolicy::FirstFit, job).unwrap();
    manager.allocate(5, PlacementPolicy::FirstFit, job).unwrap();
    assert_eq!(manager.job_memory(job), 15);

    manager.release(first).unwrap();
    assert_eq!(manager.job_memory(job), 5);

    let _ = manager.allocate(100, PlacementPolicy::FirstFit, job);

    let stats = manager.job_stats(job).unwrap();
    assert_eq!(stats.peak_bytes, 15);
    assert_eq!(stats.allocation_count, 2);
    assert_eq!(stats.failed_count, 1);
}

#[test]
fn test_stats_reflect_fragmentation() {
    let manager = MemoryManager::with_capacity(50);
    let a = manager.allocate(10, PlacementPolicy::FirstFit, 1).unwrap();
    manager.allocate(10, PlacementPolicy::FirstFit, 2).unwrap();
    manager.release(a).unwrap();

    let stats = manager.stats();
    assert_eq!(stats.total_memory, 50);
    assert_eq!(stats.used_memory, 10);
    assert_eq!(stats.available_memory, 40);
    assert_eq!(stats.allocated_blocks, 1);
    assert_eq!(stats.free_blocks, 2);
    assert_eq!(stats.largest_free_block, 30);
    assert!((stats.external_fragmentation - 0.25).abs() < 1e-9);
}

#[test]
fn test_invalid_policy_string_is_surfaced() {
    let result = PlacementPolicy::from_str("buddy");
    assert_eq!(result, Err(MemoryError::InvalidPolicy("buddy".to_string())));
}

#[test]
fn test_usable_through_trait_object() {
    let manager = MemoryManager::with_capacity(50);
    let allocator: &dyn Allocator = &manager;

    let handle = allocator
        .allocate(10, PlacementPolicy::WorstFit, 1)
        .unwrap();
    assert_eq!(allocator.handle_size(handle), Some(10));
    allocator.release(handle).unwrap();
    assert!(!allocator.is_live(handle));
}

#[test]
fn test_journal_records_follow_operation_order() {
    let journal = Arc::new(Journal::new());
    let manager = MemoryManager::with_capacity(50).with_journal(Arc::clone(&journal));

    let handle = manager.allocate(10, PlacementPolicy::FirstFit, 1).unwrap();
    let _ = manager.allocate(60, PlacementPolicy::FirstFit, 2);
    manager.release(handle).unwrap();

    let kinds: Vec<_> = journal.events().iter().map(|e| e.kind()).collect();
    assert_eq!(
        kinds,
        ["init", "allocated", "allocation_failed", "released"]
    );

    // every record carries a well-formed snapshot of the post-state
    for record in journal.records() {
        assert_well_formed(&record.blocks, 50);
    }
    let records = journal.records();
    assert_eq!(
        layout(&records[1].blocks),
        vec![(0, 10, false), (10, 40, true)]
    );
    assert_eq!(layout(&records[3].blocks), vec![(0, 50, true)]);
}

#[test]
fn test_concurrent_allocations() {
    use std::thread;

    let manager = Arc::new(MemoryManager::with_capacity(1000));
    let mut handles = vec![];

    for i in 0..10 {
        let manager_clone = Arc::clone(&manager);
        let handle = thread::spawn(move || {
            let job = 100 + i;
            manager_clone
                .allocate(10, PlacementPolicy::FirstFit, job)
                .unwrap();
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let (_, used, _) = manager.info();
    assert_eq!(used, 100);
    assert_well_formed(&manager.snapshot(), 1000);
}
