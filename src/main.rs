use anyhow::Result;
use clap::Parser;
use crossbeam_channel::unbounded;

use shadow_stats::cli::{validate_cli_args, Cli};
use shadow_stats::config::StatsConfig;
use shadow_stats::output;
use shadow_stats::parallel::ParallelProcessor;
use shadow_stats::platform::{ExitCode, SignalHandler};
use shadow_stats::readers::LogSource;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = validate_cli_args(&cli) {
        eprintln!("shadow-stats: {}", e);
        ExitCode::InvalidUsage.exit();
    }

    match run(StatsConfig::from_cli(cli)) {
        Ok(code) => code.exit(),
        Err(e) => {
            eprintln!("shadow-stats: {:#}", e);
            ExitCode::GeneralError.exit();
        }
    }
}

fn run(config: StatsConfig) -> Result<ExitCode> {
    let (ctrl_tx, ctrl_rx) = unbounded();
    let _signals = SignalHandler::new(ctrl_tx)?;

    eprintln!("processing input from {}...", config.logpath);
    let source = LogSource::open(&config.logpath)?;

    let processor = ParallelProcessor::new(config.parallel_config());
    let outcome = processor.process(source, config.tee, ctrl_rx)?;

    if SignalHandler::should_terminate() {
        eprintln!("interrupted, terminating worker pool");
        return Ok(ExitCode::SignalInt);
    }

    eprintln!(
        "done processing input: simulation ran for {} hours and consumed {} GiB of RAM",
        outcome.summary.peak_hours, outcome.summary.peak_maxrss_gib
    );
    eprintln!("{}", outcome.processing.format_stats());

    eprintln!("dumping stats in {}", config.prefix.display());
    output::dump_stats(&outcome.stats, &config.prefix, config.compress)?;
    eprintln!("all done!");

    Ok(ExitCode::Success)
}
