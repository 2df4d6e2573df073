//! Runtime configuration derived from the CLI.

use std::path::PathBuf;

use crate::cli::Cli;
use crate::parallel::ParallelConfig;

/// Resolved settings for one run.
#[derive(Debug, Clone)]
pub struct StatsConfig {
    pub logpath: String,
    pub prefix: PathBuf,
    pub workers: usize,
    pub batch_lines: usize,
    pub tee: bool,
    pub compress: bool,
}

impl StatsConfig {
    pub fn from_cli(cli: Cli) -> Self {
        let workers = if cli.workers == 0 {
            num_cpus::get()
        } else {
            cli.workers
        };

        Self {
            logpath: cli.logpath,
            prefix: cli.prefix,
            workers,
            batch_lines: cli.batch_lines,
            tee: cli.tee,
            compress: !cli.no_compress,
        }
    }

    pub fn parallel_config(&self) -> ParallelConfig {
        ParallelConfig {
            num_workers: self.workers,
            batch_size: self.batch_lines,
            ..ParallelConfig::default()
        }
    }
}
