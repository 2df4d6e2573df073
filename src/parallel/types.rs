//! Type definitions for the parallel pipeline.

use crate::aggregate::LineStats;

/// Lines gathered per batch before dispatch to a worker.
pub const DEFAULT_BATCH_LINES: usize = 10_000;

/// Configuration for parallel processing.
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    pub num_workers: usize,
    pub batch_size: usize,
    /// Bound on the raw-line channel between the reader and the batcher;
    /// this is what keeps peak memory flat on multi-gigabyte logs.
    pub buffer_size: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            num_workers: 1,
            batch_size: DEFAULT_BATCH_LINES,
            buffer_size: DEFAULT_BATCH_LINES,
        }
    }
}

/// A batch of raw lines to be parsed together.
#[derive(Debug, Clone)]
pub struct Batch {
    pub id: u64,
    pub lines: Vec<String>,
}

/// Message type for the I/O reader thread.
#[derive(Debug)]
pub(crate) enum LineMessage {
    Line(String),
    Error(std::io::Error),
    Eof,
}

/// Result of parsing one batch: the recognized-line fragments plus counters
/// for diagnostics. `batch_id` lets the sink restore submission order.
#[derive(Debug)]
pub struct BatchResult {
    pub batch_id: u64,
    pub parsed: Vec<LineStats>,
    pub lines_read: usize,
}
