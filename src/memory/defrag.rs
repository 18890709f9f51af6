/*!
 * Defragmenter
 * Quiescent-phase compaction of the block ledger
 */

use super::manager::MemoryManager;
use super::types::CompactStats;
use crate::core::types::{BlockId, Offset};
use crate::monitoring::JournalEvent;
use ahash::RandomState;
use log::info;
use std::collections::HashMap;

impl MemoryManager {
    /// Compact the address space: allocated blocks first, free capacity last
    ///
    /// Stable-partitions blocks into allocated-then-free, preserving relative
    /// order within each group, and recomputes every start offset by walking
    /// the new order from 0. The now-contiguous free run is then folded into
    /// a single trailing block, so the no-adjacent-free invariant holds after
    /// compaction too.
    ///
    /// Must only run when no allocate/release is in flight: the pass moves
    /// every block, and callers mid-operation would observe shifting offsets.
    /// The ledger lock enforces atomicity; the caller enforces quiescence
    /// (join the workers first).
    pub fn compact(&self) -> CompactStats {
        let mut ledger = self.ledger.lock();

        let old_starts: HashMap<BlockId, Offset, RandomState> = ledger
            .blocks
            .iter()
            .map(|block| (block.id, block.start))
            .collect();

        // stable partition keeps relative order within each group
        let (mut reordered, free): (Vec<_>, Vec<_>) =
            ledger.blocks.drain(..).partition(|block| !block.free);
        let first_free = reordered.len();
        reordered.extend(free);

        let mut cursor = 0;
        for block in reordered.iter_mut() {
            block.start = cursor;
            cursor += block.size;
        }
        ledger.blocks = reordered;

        // fold the trailing free run into one block; the earliest free block
        // in the run survives with its id
        let mut merged_free = 0;
        while ledger.blocks.len() > first_free + 1 {
            let absorbed = ledger.blocks.remove(first_free + 1);
            ledger.blocks[first_free].size += absorbed.size;
            merged_free += 1;
        }
        ledger.rebuild_index();

        let moved = ledger
            .blocks
            .iter()
            .filter(|block| old_starts.get(&block.id) != Some(&block.start))
            .count();

        debug_assert_eq!(ledger.check_invariants(), Ok(()));
        self.record(&ledger, JournalEvent::Defragmented { moved, merged_free });
        info!(
            "Compaction moved {} blocks and merged {} free blocks",
            moved, merged_free
        );
        CompactStats { moved, merged_free }
    }
}
