/*!
 * Simulation Module
 * Concurrent job workers driving allocator demand
 */

mod simulator;
mod types;

// Re-export for convenience
pub use simulator::JobSimulator;
pub use types::{JobOutcome, SimConfig, SimReport};
