/*!
 * Memory Manager
 * Serializes every ledger mutation behind a single lock
 */

use super::ledger::BlockLedger;
use super::placement::{self, PlacementPolicy};
use super::traits::{Allocator, Defragmenter, MemoryInfo};
use super::types::{
    Block, CompactStats, Handle, JobMemoryStats, MemoryError, MemoryResult, MemoryStats,
};
use crate::core::limits;
use crate::core::types::{JobId, Size};
use crate::monitoring::{Journal, JournalEvent};
use ahash::RandomState;
use dashmap::DashMap;
use log::{error, info, warn};
use parking_lot::Mutex;
use std::sync::Arc;

/// Per-job allocation tracking (for peak bytes and counts)
#[derive(Debug, Default, Clone)]
struct JobMemoryTracking {
    current_bytes: Size,
    peak_bytes: Size,
    allocation_count: usize,
    failed_count: usize,
}

/// Memory manager
///
/// Exclusive owner of the block ledger. Each allocate/release/compact call
/// is one critical section; the invariant set holds between calls and is
/// never observed mid-mutation by any other caller. Journal records are
/// appended while the lock is held, so journal order equals the total
/// operation order.
pub struct MemoryManager {
    pub(super) ledger: Arc<Mutex<BlockLedger>>,
    pub(super) journal: Option<Arc<Journal>>,
    job_tracking: Arc<DashMap<JobId, JobMemoryTracking, RandomState>>,
}

impl MemoryManager {
    pub fn new() -> Self {
        Self::with_capacity(limits::TOTAL_MEMORY)
    }

    /// Create a manager over a fresh ledger of `total` units
    pub fn with_capacity(total: Size) -> Self {
        info!("Memory manager initialized over {} units", total);
        Self {
            ledger: Arc::new(Mutex::new(BlockLedger::initialize(total))),
            journal: None,
            job_tracking: Arc::new(DashMap::with_hasher(RandomState::new())),
        }
    }

    /// Attach a journal; records the initial ledger state
    pub fn with_journal(mut self, journal: Arc<Journal>) -> Self {
        {
            let ledger = self.ledger.lock();
            journal.record(
                JournalEvent::Init {
                    total: ledger.total(),
                },
                ledger.snapshot(),
            );
        }
        self.journal = Some(journal);
        self
    }

    /// Allocate `size` units under `policy` for `job`
    ///
    /// Non-blocking: if no free block fits, the request fails immediately
    /// with `OutOfMemory` and is never retried or queued.
    pub fn allocate(&self, size: Size, policy: PlacementPolicy, job: JobId) -> MemoryResult<Handle> {
        if size == 0 {
            warn!("Job {} requested a zero-size allocation", job);
            return Err(MemoryError::InvalidRequest { size });
        }

        let mut ledger = self.ledger.lock();
        let chosen = placement::select(policy, ledger.blocks(), size);
        let id = match chosen {
            Some(id) => id,
            None => {
                let free: Vec<Size> = ledger
                    .blocks()
                    .iter()
                    .filter(|b| b.free)
                    .map(|b| b.size)
                    .collect();
                let largest_free = free.iter().copied().max().unwrap_or(0);
                let total_free: Size = free.iter().sum();
                error!(
                    "OOM: job {} requested {} units under {}, largest free block {} ({} free in total)",
                    job, size, policy, largest_free, total_free
                );
                self.track_failure(job);
                self.record(&ledger, JournalEvent::AllocationFailed { size, job });
                return Err(MemoryError::OutOfMemory {
                    requested: size,
                    largest_free,
                    total_free,
                });
            }
        };

        ledger.claim(id, size, job)?;
        self.track_allocation(job, size);
        self.record(&ledger, JournalEvent::Allocated { size, job });
        info!(
            "Allocated {} units at block {} for job {} via {}",
            size, id, job, policy
        );
        Ok(Handle::new(id))
    }

    /// Release the block behind `handle` and coalesce with both neighbors
    ///
    /// A handle that no longer resolves to a live block is a caller bug:
    /// surfaced as `UnknownHandle`, never silently ignored.
    pub fn release(&self, handle: Handle) -> MemoryResult<()> {
        let mut ledger = self.ledger.lock();
        match ledger.free_and_coalesce(handle.id()) {
            Ok((size, owner)) => {
                if let Some(job) = owner {
                    self.track_release(job, size);
                }
                self.record(&ledger, JournalEvent::Released { size });
                info!("Released {} units from block {}", size, handle.id());
                Ok(())
            }
            Err(err) => {
                error!(
                    "Release of {} rejected: handle does not resolve to a live block",
                    handle.id()
                );
                Err(err)
            }
        }
    }

    /// Whether `handle` still resolves to a live allocated block
    pub fn is_live(&self, handle: Handle) -> bool {
        self.ledger
            .lock()
            .get(handle.id())
            .map_or(false, |block| !block.free)
    }

    /// Size of the block behind `handle`, if live
    pub fn handle_size(&self, handle: Handle) -> Option<Size> {
        self.ledger
            .lock()
            .get(handle.id())
            .filter(|block| !block.free)
            .map(|block| block.size)
    }

    /// Ordered snapshot of the current ledger state
    pub fn snapshot(&self) -> Vec<Block> {
        self.ledger.lock().snapshot()
    }

    /// Get overall memory statistics
    pub fn stats(&self) -> MemoryStats {
        let ledger = self.ledger.lock();
        let total = ledger.total();
        let mut used = 0;
        let mut allocated_blocks = 0;
        let mut free_blocks = 0;
        let mut largest_free_block = 0;
        for block in ledger.blocks() {
            if block.free {
                free_blocks += 1;
                largest_free_block = largest_free_block.max(block.size);
            } else {
                allocated_blocks += 1;
                used += block.size;
            }
        }
        let available = total - used;
        MemoryStats {
            total_memory: total,
            used_memory: used,
            available_memory: available,
            usage_percentage: (used as f64 / total as f64) * 100.0,
            allocated_blocks,
            free_blocks,
            largest_free_block,
            external_fragmentation: if available == 0 {
                0.0
            } else {
                1.0 - largest_free_block as f64 / available as f64
            },
        }
    }

    /// Get memory info as (total, used, available)
    pub fn info(&self) -> (Size, Size, Size) {
        let stats = self.stats();
        (
            stats.total_memory,
            stats.used_memory,
            stats.available_memory,
        )
    }

    /// Units currently held by `job`
    pub fn job_memory(&self, job: JobId) -> Size {
        self.job_tracking
            .get(&job)
            .map_or(0, |track| track.current_bytes)
    }

    /// Per-job statistics, if the job ever issued a request
    pub fn job_stats(&self, job: JobId) -> Option<JobMemoryStats> {
        self.job_tracking.get(&job).map(|track| JobMemoryStats {
            job,
            current_bytes: track.current_bytes,
            peak_bytes: track.peak_bytes,
            allocation_count: track.allocation_count,
            failed_count: track.failed_count,
        })
    }

    pub(super) fn record(&self, ledger: &BlockLedger, event: JournalEvent) {
        if let Some(journal) = &self.journal {
            journal.record(event, ledger.snapshot());
        }
    }

    fn track_allocation(&self, job: JobId, size: Size) {
        let mut track = self
            .job_tracking
            .entry(job)
            .or_insert_with(JobMemoryTracking::default);
        track.current_bytes += size;
        track.allocation_count += 1;
        if track.current_bytes > track.peak_bytes {
            track.peak_bytes = track.current_bytes;
        }
    }

    fn track_release(&self, job: JobId, size: Size) {
        if let Some(mut track) = self.job_tracking.get_mut(&job) {
            track.current_bytes = track.current_bytes.saturating_sub(size);
        }
    }

    fn track_failure(&self, job: JobId) {
        let mut track = self
            .job_tracking
            .entry(job)
            .or_insert_with(JobMemoryTracking::default);
        track.failed_count += 1;
    }
}

// Implement trait interfaces
impl Allocator for MemoryManager {
    fn allocate(&self, size: Size, policy: PlacementPolicy, job: JobId) -> MemoryResult<Handle> {
        MemoryManager::allocate(self, size, policy, job)
    }

    fn release(&self, handle: Handle) -> MemoryResult<()> {
        MemoryManager::release(self, handle)
    }

    fn is_live(&self, handle: Handle) -> bool {
        MemoryManager::is_live(self, handle)
    }

    fn handle_size(&self, handle: Handle) -> Option<Size> {
        MemoryManager::handle_size(self, handle)
    }
}

impl MemoryInfo for MemoryManager {
    fn stats(&self) -> MemoryStats {
        MemoryManager::stats(self)
    }

    fn info(&self) -> (Size, Size, Size) {
        MemoryManager::info(self)
    }

    fn job_memory(&self, job: JobId) -> Size {
        MemoryManager::job_memory(self, job)
    }
}

impl Defragmenter for MemoryManager {
    fn compact(&self) -> CompactStats {
        MemoryManager::compact(self)
    }
}

impl Clone for MemoryManager {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            journal: self.journal.as_ref().map(Arc::clone),
            job_tracking: Arc::clone(&self.job_tracking),
        }
    }
}

impl Default for MemoryManager {
    fn default() -> Self {
        Self::new()
    }
}
