/*!
 * Block Ledger
 *
 * Ordered, contiguous record of blocks covering the whole address space.
 * Sole owner of all Block records; every mutation re-establishes the
 * ledger invariants:
 *
 * 1. blocks sorted by start ascending
 * 2. contiguous: each block starts where the previous one ends
 * 3. coverage: first block starts at 0, last block ends at total
 * 4. no two adjacent free blocks
 * 5. every block has positive size
 */

use super::types::{Block, MemoryError, MemoryResult};
use crate::core::types::{BlockId, JobId, Size};
use ahash::RandomState;
use std::collections::HashMap;

/// Ordered block record plus the id-to-position index handles resolve through
#[derive(Debug, Clone)]
pub struct BlockLedger {
    pub(super) blocks: Vec<Block>,
    pub(super) index: HashMap<BlockId, usize, RandomState>,
    next_id: u64,
    total: Size,
}

impl BlockLedger {
    /// Create a ledger with a single free block spanning `[0, total)`
    pub fn initialize(total: Size) -> Self {
        assert!(total > 0, "address space must be non-empty");
        let mut ledger = Self {
            blocks: Vec::new(),
            index: HashMap::default(),
            next_id: 0,
            total,
        };
        let id = ledger.fresh_id();
        ledger.blocks.push(Block {
            id,
            start: 0,
            size: total,
            free: true,
            owner: None,
        });
        ledger.rebuild_index();
        ledger
    }

    pub fn total(&self) -> Size {
        self.total
    }

    /// Ordered view of the current blocks
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Owned ordered copy for logging and test verification
    pub fn snapshot(&self) -> Vec<Block> {
        self.blocks.clone()
    }

    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.index.get(&id).map(|&pos| &self.blocks[pos])
    }

    fn fresh_id(&mut self) -> BlockId {
        let id = BlockId::new(self.next_id);
        self.next_id += 1;
        id
    }

    pub(super) fn rebuild_index(&mut self) {
        self.index.clear();
        for (pos, block) in self.blocks.iter().enumerate() {
            self.index.insert(block.id, pos);
        }
    }

    /// Claim `size` units out of the free block `id` for `owner`
    ///
    /// If the block is larger than the request, the surplus is split off
    /// into a fresh free block immediately after; the claimed segment keeps
    /// the original id.
    pub(super) fn claim(&mut self, id: BlockId, size: Size, owner: JobId) -> MemoryResult<()> {
        let pos = match self.index.get(&id) {
            Some(&pos) => pos,
            None => return Err(MemoryError::UnknownHandle(id)),
        };
        debug_assert!(self.blocks[pos].free && self.blocks[pos].size >= size);

        let (start, old_size) = (self.blocks[pos].start, self.blocks[pos].size);
        if old_size > size {
            let leftover = Block {
                id: self.fresh_id(),
                start: start + size,
                size: old_size - size,
                free: true,
                owner: None,
            };
            self.blocks[pos].size = size;
            self.blocks.insert(pos + 1, leftover);
            self.rebuild_index();
        }

        let block = &mut self.blocks[pos];
        block.free = false;
        block.owner = Some(owner);

        debug_assert_eq!(self.check_invariants(), Ok(()));
        Ok(())
    }

    /// Mark the block `id` free and merge it with both immediate neighbors
    ///
    /// Absorbing the successor keeps the released block's id; folding into a
    /// free predecessor keeps the predecessor's id. One pass suffices since
    /// only one block changed state. Returns the released size and owner.
    pub(super) fn free_and_coalesce(&mut self, id: BlockId) -> MemoryResult<(Size, Option<JobId>)> {
        let pos = match self.index.get(&id) {
            Some(&pos) => pos,
            None => return Err(MemoryError::UnknownHandle(id)),
        };
        if self.blocks[pos].free {
            // double release resolves to a block that is no longer live
            return Err(MemoryError::UnknownHandle(id));
        }

        let size = self.blocks[pos].size;
        let owner = self.blocks[pos].owner.take();
        self.blocks[pos].free = true;

        if pos + 1 < self.blocks.len() && self.blocks[pos + 1].free {
            let successor = self.blocks.remove(pos + 1);
            self.blocks[pos].size += successor.size;
        }
        if pos > 0 && self.blocks[pos - 1].free {
            let released = self.blocks.remove(pos);
            self.blocks[pos - 1].size += released.size;
        }
        self.rebuild_index();

        debug_assert_eq!(self.check_invariants(), Ok(()));
        Ok((size, owner))
    }

    /// Verify invariants 1-5; returns a description of the first violation
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.blocks.is_empty() {
            return Err("ledger has no blocks".to_string());
        }
        let mut cursor = 0;
        for (i, block) in self.blocks.iter().enumerate() {
            if block.size == 0 {
                return Err(format!("block {} has zero size", block.id));
            }
            if block.start != cursor {
                return Err(format!(
                    "block {} starts at {}, expected {}",
                    block.id, block.start, cursor
                ));
            }
            cursor += block.size;
            if block.free && block.owner.is_some() {
                return Err(format!("free block {} still has an owner", block.id));
            }
            if i > 0 && block.free && self.blocks[i - 1].free {
                return Err(format!(
                    "adjacent free blocks at {} and {}",
                    self.blocks[i - 1].start,
                    block.start
                ));
            }
        }
        if cursor != self.total {
            return Err(format!("coverage ends at {}, expected {}", cursor, self.total));
        }
        Ok(())
    }
}
