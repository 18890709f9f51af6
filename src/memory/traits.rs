/*!
 * Memory Traits
 * Allocator abstractions
 */

use super::placement::PlacementPolicy;
use super::types::{CompactStats, Handle, MemoryResult, MemoryStats};
use crate::core::types::{JobId, Size};

/// Memory allocator interface
pub trait Allocator: Send + Sync {
    /// Allocate `size` units for a job under a placement policy
    fn allocate(&self, size: Size, policy: PlacementPolicy, job: JobId) -> MemoryResult<Handle>;

    /// Release an allocated block
    fn release(&self, handle: Handle) -> MemoryResult<()>;

    /// Check if a handle still resolves to a live allocated block
    fn is_live(&self, handle: Handle) -> bool;

    /// Get the size of the block behind a handle, if live
    fn handle_size(&self, handle: Handle) -> Option<Size>;
}

/// Memory statistics provider
pub trait MemoryInfo: Send + Sync {
    /// Get overall memory statistics
    fn stats(&self) -> MemoryStats;

    /// Get memory info as (total, used, available)
    fn info(&self) -> (Size, Size, Size) {
        let stats = self.stats();
        (
            stats.total_memory,
            stats.used_memory,
            stats.available_memory,
        )
    }

    /// Get memory currently held by a specific job
    fn job_memory(&self, job: JobId) -> Size;
}

/// Compaction interface
pub trait Defragmenter: Send + Sync {
    /// Run one compaction pass; requires quiescence
    fn compact(&self) -> CompactStats;
}
