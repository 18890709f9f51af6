/*!
 * Run Limits and Constants
 *
 * Centralized location for the simulator's fixed configuration surface.
 * The binary takes no arguments; these constants are the only knobs.
 */

// =============================================================================
// ADDRESS SPACE
// =============================================================================

/// Total simulated address space (50 units)
/// Small on purpose: fragmentation effects are visible in a handful of blocks
pub const TOTAL_MEMORY: usize = 50;

// =============================================================================
// JOB SIMULATION
// =============================================================================

/// Number of concurrent simulated jobs
pub const JOB_COUNT: u32 = 5;

/// Largest request a job may draw (inclusive)
/// Must stay below TOTAL_MEMORY or every run degenerates to denials
pub const MAX_REQUEST: usize = 20;

/// Shortest simulated hold time in milliseconds
pub const MIN_HOLD_MS: u64 = 100;

/// Longest simulated hold time in milliseconds
pub const MAX_HOLD_MS: u64 = 500;

// =============================================================================
// OBSERVABILITY
// =============================================================================

/// Default journal sink path, one JSON record per line
pub const JOURNAL_PATH: &str = "memory_journal.jsonl";

/// Pre-allocated journal capacity
/// A run emits one record per operation plus init and compaction
pub const JOURNAL_CAPACITY: usize = 64;
