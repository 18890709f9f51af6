/*!
 * Placement Simulator - Main Entry Point
 *
 * Drives one full run:
 * - concurrent jobs allocate, hold, and release under random policies
 * - a quiescent compaction pass consolidates the surviving free capacity
 * - every state transition lands in the journal for inspection
 */

use log::info;
use memsim::core::limits;
use memsim::{JobSimulator, Journal, MemoryManager, SimConfig};
use std::error::Error;
use std::fs::File;
use std::sync::Arc;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Placement simulator starting...");
    info!("================================================");

    info!("Opening journal sink at {}", limits::JOURNAL_PATH);
    let sink = File::create(limits::JOURNAL_PATH)?;
    let journal = Arc::new(Journal::with_sink(Box::new(sink)));

    info!("Initializing memory manager...");
    let manager =
        MemoryManager::with_capacity(limits::TOTAL_MEMORY).with_journal(Arc::clone(&journal));

    info!("Starting job simulation...");
    let simulator = JobSimulator::new(manager.clone(), SimConfig::default());
    let report = simulator.run();

    for outcome in &report.outcomes {
        if let Some(stats) = manager.job_stats(outcome.job) {
            info!(
                "Job {}: requested {} via {}, peak {} units, {} denied",
                outcome.job, outcome.requested, outcome.policy, stats.peak_bytes, stats.failed_count
            );
        }
    }

    info!("Compacting address space...");
    let compact = manager.compact();

    let stats = manager.stats();
    info!("================================================");
    info!(
        "Final state: {} / {} units used, {} allocated and {} free blocks, largest free {}",
        stats.used_memory,
        stats.total_memory,
        stats.allocated_blocks,
        stats.free_blocks,
        stats.largest_free_block
    );
    info!(
        "Compaction moved {} blocks, merged {} free blocks; {} journal records written to {}",
        compact.moved,
        compact.merged_free,
        journal.len(),
        limits::JOURNAL_PATH
    );

    Ok(())
}
