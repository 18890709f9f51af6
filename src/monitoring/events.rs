/*!
 * Journal Events
 * Strongly-typed state-transition records
 */

use crate::core::types::{JobId, Size};
use crate::memory::Block;
use serde::{Deserialize, Serialize};

/// One allocator state transition
///
/// Within a run the record order is significant; the content is not a wire
/// format and carries no cross-run stability guarantee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JournalEvent {
    Init { total: Size },
    Allocated { size: Size, job: JobId },
    AllocationFailed { size: Size, job: JobId },
    Released { size: Size },
    Defragmented { moved: usize, merged_free: usize },
}

impl JournalEvent {
    /// Short name for logging and test assertions
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init",
            Self::Allocated { .. } => "allocated",
            Self::AllocationFailed { .. } => "allocation_failed",
            Self::Released { .. } => "released",
            Self::Defragmented { .. } => "defragmented",
        }
    }
}

/// Journal entry: the transition plus the full ledger snapshot after it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRecord {
    pub seq: u64,
    pub event: JournalEvent,
    pub blocks: Vec<Block>,
}
