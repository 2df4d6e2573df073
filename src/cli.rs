//! Command-line interface definitions and validation.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::parallel::DEFAULT_BATCH_LINES;

#[derive(Parser, Debug)]
#[command(name = "shadow-stats")]
#[command(about = "Parse Shadow simulator heartbeat logs into compressed JSON statistics")]
#[command(
    long_about = "Parse Shadow simulator heartbeat logs into compressed JSON statistics\n\n\
Processes shadow.log files and stores the aggregated per-tick and per-node\n\
data as JSON for plotting. The log file never needs to be stored on disk\n\
decompressed, which matters once log sizes reach tens of gigabytes.\n\n\
COMMON EXAMPLES:\n  \
shadow-stats shadow.log\n  \
shadow-stats shadow.log.xz\n  \
cat shadow.log | shadow-stats -\n  \
xzcat shadow.log.xz | shadow-stats -\n  \
shadow-stats -m 0 -p results/ shadow.log.xz\n\n\
The default is a single parsing worker; pass -m to parallelize."
)]
#[command(version)]
pub struct Cli {
    /// The PATH to the shadow.log file; may be '-' for stdin, may be gzip or
    /// zstd compressed, or may end in '.xz' for inline xz decompression
    #[arg(value_name = "PATH")]
    pub logpath: String,

    /// Number of parallel parsing workers; use '0' for the number of
    /// processor cores
    #[arg(
        short = 'm',
        long = "workers",
        value_name = "N",
        default_value_t = 1,
        help_heading = "Processing Options"
    )]
    pub workers: usize,

    /// Lines gathered per batch before dispatch to a worker
    #[arg(
        long = "batch-lines",
        value_name = "N",
        default_value_t = DEFAULT_BATCH_LINES,
        help_heading = "Processing Options"
    )]
    pub batch_lines: usize,

    /// Directory path prefix where the processed data file will be written
    #[arg(
        short = 'p',
        long = "prefix",
        value_name = "DIR",
        default_value = ".",
        help_heading = "Output Options"
    )]
    pub prefix: PathBuf,

    /// Write stats.shadow.json uncompressed instead of piping through xz
    #[arg(long = "no-compress", help_heading = "Output Options")]
    pub no_compress: bool,

    /// Echo decompressed log input back to stdout
    #[arg(short = 't', long = "tee", help_heading = "Input Options")]
    pub tee: bool,
}

/// Validate CLI arguments for early error detection
pub fn validate_cli_args(cli: &Cli) -> Result<()> {
    if cli.batch_lines == 0 {
        return Err(anyhow::anyhow!("Batch size must be greater than 0"));
    }

    if cli.workers > 1000 {
        return Err(anyhow::anyhow!("Worker count too high (max 1000)"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("args should parse")
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["shadow-stats", "shadow.log"]);
        assert_eq!(cli.logpath, "shadow.log");
        assert_eq!(cli.workers, 1);
        assert_eq!(cli.batch_lines, DEFAULT_BATCH_LINES);
        assert!(!cli.tee);
        assert!(!cli.no_compress);
    }

    #[test]
    fn test_stdin_path() {
        let cli = parse(&["shadow-stats", "-"]);
        assert_eq!(cli.logpath, "-");
    }

    #[test]
    fn test_validation_rejects_zero_batch() {
        let cli = parse(&["shadow-stats", "--batch-lines", "0", "shadow.log"]);
        assert!(validate_cli_args(&cli).is_err());
    }

    #[test]
    fn test_validation_rejects_absurd_worker_count() {
        let cli = parse(&["shadow-stats", "-m", "5000", "shadow.log"]);
        assert!(validate_cli_args(&cli).is_err());
    }
}
