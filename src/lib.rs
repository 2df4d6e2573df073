// Core library for the shadow-stats log parsing tool

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod decompression;
pub mod heartbeat;
pub mod output;
pub mod parallel;
pub mod platform;
pub mod readers;
pub mod stats;
pub mod timestamp;

pub use aggregate::{RunSummary, SimStats, TrafficLabel};
pub use config::StatsConfig;
pub use parallel::{ParallelConfig, ParallelProcessor, ParseOutcome};
