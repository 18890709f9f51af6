/*!
 * Journal
 * Append-only record store with an optional line-delimited JSON sink
 */

use super::events::{JournalEvent, JournalRecord};
use crate::core::limits;
use crate::memory::Block;
use log::warn;
use parking_lot::Mutex;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};

/// Append-only journal of allocator state transitions
///
/// Records are kept in memory for test verification and optionally mirrored
/// to a writer as one JSON object per line. Callers append while holding the
/// ledger lock, so record order equals the total operation order. A failing
/// sink is logged and skipped, never fatal.
pub struct Journal {
    records: Mutex<Vec<JournalRecord>>,
    sink: Option<Mutex<Box<dyn Write + Send>>>,
    seq: AtomicU64,
}

impl Journal {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::with_capacity(limits::JOURNAL_CAPACITY)),
            sink: None,
            seq: AtomicU64::new(0),
        }
    }

    /// Journal that also mirrors records to `sink`, one JSON line each
    pub fn with_sink(sink: Box<dyn Write + Send>) -> Self {
        Self {
            records: Mutex::new(Vec::with_capacity(limits::JOURNAL_CAPACITY)),
            sink: Some(Mutex::new(sink)),
            seq: AtomicU64::new(0),
        }
    }

    /// Append one transition together with the post-state snapshot
    pub fn record(&self, event: JournalEvent, blocks: Vec<Block>) {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        let record = JournalRecord { seq, event, blocks };

        if let Some(sink) = &self.sink {
            match serde_json::to_string(&record) {
                Ok(line) => {
                    let mut sink = sink.lock();
                    if let Err(err) = writeln!(sink, "{}", line) {
                        warn!("Journal sink write failed: {}", err);
                    }
                }
                Err(err) => warn!("Journal record serialization failed: {}", err),
            }
        }

        self.records.lock().push(record);
    }

    /// All records in append order
    pub fn records(&self) -> Vec<JournalRecord> {
        self.records.lock().clone()
    }

    /// All events in append order, without snapshots
    pub fn events(&self) -> Vec<JournalEvent> {
        self.records
            .lock()
            .iter()
            .map(|record| record.event.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl Default for Journal {
    fn default() -> Self {
        Self::new()
    }
}
