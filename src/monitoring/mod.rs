/*!
 * Monitoring Module
 * Append-only journal of allocator state transitions
 */

mod events;
mod journal;

// Re-export for convenience
pub use events::{JournalEvent, JournalRecord};
pub use journal::Journal;
