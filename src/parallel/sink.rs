//! Ordered reducer sink.
//!
//! Batch results arrive in completion order, which under a pool of workers
//! is not submission order. The sink buffers out-of-order results and folds
//! them strictly by batch id, so the run-wide "first tick sample wins" rule
//! matches the order the input was read.

use anyhow::Result;
use crossbeam_channel::Receiver;
use std::collections::HashMap;

use crate::aggregate::{RunSummary, SimStats};
use crate::platform::SignalHandler;
use crate::stats::ProcessingStats;

use super::types::BatchResult;

/// Everything the reducer accumulated over the run.
#[derive(Debug)]
pub(crate) struct ReduceOutcome {
    pub stats: SimStats,
    pub summary: RunSummary,
    pub processing: ProcessingStats,
}

pub(crate) fn reducer_sink_thread(result_receiver: Receiver<BatchResult>) -> Result<ReduceOutcome> {
    let mut pending: HashMap<u64, BatchResult> = HashMap::new();
    let mut next_expected_id = 0u64;

    let mut stats = SimStats::new();
    let mut summary = RunSummary::default();
    let mut processing = ProcessingStats::new();

    while let Ok(result) = result_receiver.recv() {
        if SignalHandler::should_terminate() {
            // Partial output is never written after an interrupt
            break;
        }

        pending.insert(result.batch_id, result);
        while let Some(batch) = pending.remove(&next_expected_id) {
            processing.add_batch(batch.lines_read, batch.parsed.len());
            stats.fold_batch(&mut summary, batch.parsed);
            next_expected_id += 1;
        }
    }

    // A worker that aborted leaves a gap; fold what remains in id order so
    // the counters stay meaningful for the error report.
    let mut leftovers: Vec<BatchResult> = pending.into_values().collect();
    leftovers.sort_by_key(|result| result.batch_id);
    for batch in leftovers {
        processing.add_batch(batch.lines_read, batch.parsed.len());
        stats.fold_batch(&mut summary, batch.parsed);
    }

    processing.finish();

    Ok(ReduceOutcome {
        stats,
        summary,
        processing,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{Fragment, LineStats, TickSample};
    use crossbeam_channel::unbounded;

    fn tick_result(batch_id: u64, second: u64, time_seconds: f64) -> BatchResult {
        BatchResult {
            batch_id,
            parsed: vec![LineStats {
                peak_maxrss_gib: 0.0,
                peak_hours: time_seconds / 3600.0,
                fragment: Fragment::Tick {
                    second,
                    sample: TickSample {
                        maxrss_gib: -1.0,
                        time_seconds,
                    },
                },
            }],
            lines_read: 1,
        }
    }

    #[test]
    fn test_sink_folds_in_submission_order() {
        let (sender, receiver) = unbounded();

        // Batch 1 completes before batch 0, both sampling second 5
        sender.send(tick_result(1, 5, 99.0)).unwrap();
        sender.send(tick_result(0, 5, 11.0)).unwrap();
        drop(sender);

        let outcome = reducer_sink_thread(receiver).unwrap();
        // Submission order decides: batch 0's sample wins
        assert_eq!(outcome.stats.ticks[&5].time_seconds, 11.0);
        assert_eq!(outcome.processing.batches_reduced, 2);
        assert_eq!(outcome.processing.lines_read, 2);
    }
}
