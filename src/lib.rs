/*!
 * Placement Simulator Library
 * Flat address-space allocator with pluggable placement policies
 */

pub mod core;
pub mod memory;
pub mod monitoring;
pub mod sim;

// Re-exports
pub use memory::{
    Allocator, Block, CompactStats, Defragmenter, Handle, MemoryError, MemoryInfo, MemoryManager,
    MemoryResult, MemoryStats, PlacementPolicy,
};
pub use monitoring::{Journal, JournalEvent, JournalRecord};
pub use sim::{JobSimulator, SimConfig, SimReport};
