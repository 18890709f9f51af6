/*!
 * Placement Policies
 * Pure candidate selection over a consistent ledger view
 */

use super::types::{Block, MemoryError, MemoryResult};
use crate::core::types::{BlockId, Size};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Placement policy configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlacementPolicy {
    /// Earliest free block that fits
    FirstFit,
    /// Smallest free block that fits
    BestFit,
    /// Largest free block that fits
    WorstFit,
}

impl PlacementPolicy {
    pub const ALL: [PlacementPolicy; 3] = [Self::FirstFit, Self::BestFit, Self::WorstFit];

    /// Parse from string representation
    pub fn from_str(s: &str) -> MemoryResult<Self> {
        match s.to_lowercase().as_str() {
            "first_fit" | "firstfit" | "ff" => Ok(Self::FirstFit),
            "best_fit" | "bestfit" | "bf" => Ok(Self::BestFit),
            "worst_fit" | "worstfit" | "wf" => Ok(Self::WorstFit),
            other => Err(MemoryError::InvalidPolicy(other.to_string())),
        }
    }

    /// Convert to string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FirstFit => "first_fit",
            Self::BestFit => "best_fit",
            Self::WorstFit => "worst_fit",
        }
    }
}

impl fmt::Display for PlacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PlacementPolicy {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PlacementPolicy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Select a free block of at least `request` units under `policy`
///
/// Read-only over a start-sorted view; never observes a partially applied
/// mutation because callers run it under the ledger lock. Ties break to the
/// lowest start: strict comparisons keep the earliest candidate.
pub fn select(policy: PlacementPolicy, blocks: &[Block], request: Size) -> Option<BlockId> {
    let mut candidates = blocks.iter().filter(|b| b.free && b.size >= request);
    let chosen = match policy {
        PlacementPolicy::FirstFit => candidates.next(),
        PlacementPolicy::BestFit => candidates.fold(None, |best: Option<&Block>, block| {
            match best {
                Some(current) if current.size <= block.size => Some(current),
                _ => Some(block),
            }
        }),
        PlacementPolicy::WorstFit => candidates.fold(None, |worst: Option<&Block>, block| {
            match worst {
                Some(current) if current.size >= block.size => Some(current),
                _ => Some(block),
            }
        }),
    };
    chosen.map(|block| block.id)
}
