/*!
 * Memory Types
 * Common types for the flat address-space allocator
 */

use crate::core::types::{BlockId, JobId, Offset, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Memory operation result
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Memory errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("Out of memory: requested {requested} units, largest free block {largest_free} ({total_free} free in total)")]
    OutOfMemory {
        requested: Size,
        largest_free: Size,
        total_free: Size,
    },

    #[error("Invalid request: size {size} must be positive")]
    InvalidRequest { size: Size },

    #[error("Unknown handle: {0} does not resolve to a live block")]
    UnknownHandle(BlockId),

    #[error("Invalid placement policy '{0}'. Valid: first_fit, best_fit, worst_fit")]
    InvalidPolicy(String),
}

/// One contiguous span of the address space, free or allocated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub start: Offset,
    pub size: Size,
    pub free: bool,
    pub owner: Option<JobId>,
}

impl Block {
    pub fn end(&self) -> Offset {
        self.start + self.size
    }
}

/// Opaque token referencing an allocated block
///
/// Wraps the block's stable id, never a position or address, so it stays
/// valid while unrelated parts of the ledger are split or merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handle(BlockId);

impl Handle {
    pub(super) fn new(id: BlockId) -> Self {
        Self(id)
    }

    pub fn id(&self) -> BlockId {
        self.0
    }
}

/// Memory statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryStats {
    pub total_memory: Size,
    pub used_memory: Size,
    pub available_memory: Size,
    pub usage_percentage: f64,
    pub allocated_blocks: usize,
    pub free_blocks: usize,
    pub largest_free_block: Size,
    /// Share of free capacity unusable by a request of the largest-free size:
    /// `1 - largest_free / total_free`, 0 when nothing is free
    pub external_fragmentation: f64,
}

/// Per-job memory statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobMemoryStats {
    pub job: JobId,
    pub current_bytes: Size,
    pub peak_bytes: Size,
    pub allocation_count: usize,
    pub failed_count: usize,
}

/// Outcome of a compaction pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactStats {
    /// Blocks whose start offset changed during the reorder
    pub moved: usize,
    /// Free blocks folded into the single trailing free block
    pub merged_free: usize,
}
