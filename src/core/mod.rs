/*!
 * Core Module
 * Fundamental types and run configuration
 */

pub mod limits;
pub mod types;

// Re-export for convenience
pub use types::*;
