//! Parallel map-reduce pipeline for heartbeat parsing.
//!
//! Raw lines flow through a fixed set of threads: an I/O reader, a batcher
//! that groups lines into bounded batches, a pool of workers each applying
//! the line parser, and a reducer sink that folds batch results into the
//! aggregate strictly in submission order (first-tick-wins depends on it).
//! Workers never touch shared mutable state; the sink is the only mutator.
//!
//! # Module Structure
//!
//! - `types`: batches, messages, and configuration
//! - `batching`: I/O reader and line batching threads
//! - `worker`: worker thread parsing batches into fragments
//! - `sink`: ordered reducer folding batch results
//! - `processor`: orchestration and thread lifecycle

mod batching;
mod processor;
mod sink;
mod types;
mod worker;

pub use processor::{ParallelProcessor, ParseOutcome};
pub use types::{ParallelConfig, DEFAULT_BATCH_LINES};
