/*!
 * Simulation Types
 * Run configuration and per-job outcomes
 */

use crate::core::limits;
use crate::core::types::{JobId, Size};
use crate::memory::PlacementPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Simulation run configuration
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of concurrent job workers
    pub jobs: u32,
    /// Largest request a job may draw (inclusive)
    pub max_request: Size,
    /// Shortest simulated hold time
    pub min_hold: Duration,
    /// Longest simulated hold time
    pub max_hold: Duration,
    /// Base seed for reproducible runs; None draws from entropy
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            jobs: limits::JOB_COUNT,
            max_request: limits::MAX_REQUEST,
            min_hold: Duration::from_millis(limits::MIN_HOLD_MS),
            max_hold: Duration::from_millis(limits::MAX_HOLD_MS),
            seed: None,
        }
    }
}

impl SimConfig {
    pub fn with_jobs(mut self, jobs: u32) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_max_request(mut self, max_request: Size) -> Self {
        self.max_request = max_request;
        self
    }

    pub fn with_hold_range(mut self, min_hold: Duration, max_hold: Duration) -> Self {
        self.min_hold = min_hold;
        self.max_hold = max_hold;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// What one job worker did with its single request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOutcome {
    pub job: JobId,
    pub policy: PlacementPolicy,
    pub requested: Size,
    pub fulfilled: bool,
}

/// Aggregate simulation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimReport {
    pub outcomes: Vec<JobOutcome>,
}

impl SimReport {
    /// Jobs that allocated, held, and released their block
    pub fn fulfilled(&self) -> usize {
        self.outcomes.iter().filter(|o| o.fulfilled).count()
    }

    /// Jobs denied by the allocator
    pub fn denied(&self) -> usize {
        self.outcomes.len() - self.fulfilled()
    }
}
