/*!
 * Core Types
 * Common types used across the simulator
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Simulated job ID type
pub type JobId = u32;

/// Offset type for positions in the flat address space
pub type Offset = usize;

/// Size type for memory operations
pub type Size = usize;

/// Stable identity of a ledger block
///
/// Assigned from a monotone counter at block creation and retained through
/// splits and merges only by the surviving segment. Never an address: block
/// offsets move during compaction, ids do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockId(u64);

impl BlockId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}
