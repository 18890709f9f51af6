/*!
 * Job Simulator
 * One worker thread per simulated job: allocate, hold, release
 */

use super::types::{JobOutcome, SimConfig, SimReport};
use crate::core::types::JobId;
use crate::memory::{MemoryError, MemoryManager, PlacementPolicy};
use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::thread;
use std::time::Duration;

/// Drives concurrent allocator demand
///
/// Workers run independently to completion; completion order is unspecified
/// and nothing may assume it. The ledger lock is never held across a hold
/// delay — workers only contend inside allocate and release themselves.
pub struct JobSimulator {
    manager: MemoryManager,
    config: SimConfig,
}

impl JobSimulator {
    pub fn new(manager: MemoryManager, config: SimConfig) -> Self {
        Self { manager, config }
    }

    /// Run every job worker to completion and join them all
    ///
    /// The join is the quiescence barrier callers rely on before compacting.
    pub fn run(&self) -> SimReport {
        info!("Spawning {} job workers", self.config.jobs);

        let mut workers = Vec::with_capacity(self.config.jobs as usize);
        for job in 0..self.config.jobs {
            let manager = self.manager.clone();
            let config = self.config.clone();
            workers.push(thread::spawn(move || run_job(&manager, &config, job)));
        }

        let mut outcomes = Vec::with_capacity(workers.len());
        for worker in workers {
            match worker.join() {
                Ok(outcome) => outcomes.push(outcome),
                Err(_) => error!("Job worker panicked"),
            }
        }

        let report = SimReport { outcomes };
        info!(
            "Simulation complete: {} fulfilled, {} denied",
            report.fulfilled(),
            report.denied()
        );
        report
    }
}

fn run_job(manager: &MemoryManager, config: &SimConfig, job: JobId) -> JobOutcome {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(job as u64)),
        None => StdRng::from_entropy(),
    };

    let requested = rng.gen_range(1..=config.max_request);
    let policy = PlacementPolicy::ALL[rng.gen_range(0..PlacementPolicy::ALL.len())];

    match manager.allocate(requested, policy, job) {
        Ok(handle) => {
            let hold_ms = rng.gen_range(
                config.min_hold.as_millis() as u64..=config.max_hold.as_millis() as u64,
            );
            thread::sleep(Duration::from_millis(hold_ms));

            if let Err(err) = manager.release(handle) {
                error!("Job {} failed to release its block: {}", job, err);
            }
            JobOutcome {
                job,
                policy,
                requested,
                fulfilled: true,
            }
        }
        Err(MemoryError::OutOfMemory { .. }) => {
            // denial is already journaled; the job gives up without retrying
            JobOutcome {
                job,
                policy,
                requested,
                fulfilled: false,
            }
        }
        Err(err) => {
            warn!("Job {} request rejected: {}", job, err);
            JobOutcome {
                job,
                policy,
                requested,
                fulfilled: false,
            }
        }
    }
}
