//! Orchestration of the reader/batcher/worker/sink threads.

use anyhow::Result;
use crossbeam_channel::{bounded, Receiver};
use std::thread;

use crate::aggregate::{RunSummary, SimStats};
use crate::platform::Ctrl;
use crate::readers::LogSource;
use crate::stats::ProcessingStats;

use super::batching::{batcher_thread, io_reader_thread};
use super::sink::reducer_sink_thread;
use super::types::ParallelConfig;
use super::worker::worker_thread;

/// Final product of a run, handed to the output collaborator.
#[derive(Debug)]
pub struct ParseOutcome {
    pub stats: SimStats,
    pub summary: RunSummary,
    pub processing: ProcessingStats,
}

/// Drives one full pass over the input through the worker pool.
pub struct ParallelProcessor {
    config: ParallelConfig,
}

impl ParallelProcessor {
    pub fn new(config: ParallelConfig) -> Self {
        Self { config }
    }

    /// Consume the input source and reduce it to a [`ParseOutcome`].
    ///
    /// All channels are bounded, so at most a few batches of raw lines are
    /// in flight at once regardless of input size. Batches are folded by the
    /// sink in submission order; the shared aggregate is only ever touched
    /// there.
    pub fn process(
        &self,
        source: LogSource,
        tee: bool,
        ctrl_rx: Receiver<Ctrl>,
    ) -> Result<ParseOutcome> {
        let num_workers = self.config.num_workers.max(1);
        let batch_size = self.config.batch_size;

        let (line_sender, line_receiver) = bounded(self.config.buffer_size);
        let (batch_sender, batch_receiver) = bounded(num_workers * 2);
        let (result_sender, result_receiver) = bounded(num_workers * 4);

        let io_handle = {
            let ctrl_for_io = ctrl_rx.clone();
            thread::spawn(move || io_reader_thread(source, line_sender, ctrl_for_io))
        };

        let batch_handle = {
            let ctrl_for_batcher = ctrl_rx.clone();
            thread::spawn(move || {
                batcher_thread(
                    line_receiver,
                    batch_sender,
                    batch_size,
                    tee,
                    ctrl_for_batcher,
                )
            })
        };

        let mut worker_handles = Vec::with_capacity(num_workers);
        for worker_id in 0..num_workers {
            let work_receiver = batch_receiver.clone();
            let result_sender = result_sender.clone();
            let worker_ctrl = ctrl_rx.clone();

            let handle = thread::spawn(move || {
                worker_thread(worker_id, work_receiver, result_sender, worker_ctrl)
            });
            worker_handles.push(handle);
        }

        // Drop our copies so channel closure propagates shutdown
        drop(batch_receiver);
        drop(result_sender);

        let sink_handle = thread::spawn(move || reducer_sink_thread(result_receiver));

        let io_result = io_handle
            .join()
            .unwrap_or_else(|e| panic!("IO thread panicked: {:?}", e));
        let batch_result = batch_handle
            .join()
            .unwrap_or_else(|e| panic!("Batcher thread panicked: {:?}", e));

        let mut worker_results = Vec::with_capacity(num_workers);
        for (idx, handle) in worker_handles.into_iter().enumerate() {
            worker_results.push(
                handle
                    .join()
                    .unwrap_or_else(|e| panic!("Worker thread {} panicked: {:?}", idx, e)),
            );
        }

        let outcome = sink_handle
            .join()
            .unwrap_or_else(|e| panic!("Reducer thread panicked: {:?}", e))?;

        // A worker parse failure also collapses the batch channel under the
        // batcher, so report the worker's error first: it is the root cause.
        for result in worker_results {
            result?;
        }
        io_result?;
        batch_result?;

        Ok(ParseOutcome {
            stats: outcome.stats,
            summary: outcome.summary,
            processing: outcome.processing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_config_default() {
        let config = ParallelConfig::default();
        assert!(config.num_workers > 0);
        assert!(config.batch_size > 0);
        assert!(config.buffer_size > 0);
    }
}
