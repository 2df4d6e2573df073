//! Signal handling, exit codes, and safe stdio wrappers.

use anyhow::Result;
use crossbeam_channel::Sender;
use std::io::{self, Write};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

#[cfg(unix)]
use signal_hook::{consts::SIGINT, consts::SIGPIPE, consts::SIGTERM, iterator::Signals};

#[cfg(windows)]
use signal_hook::{consts::SIGINT, iterator::Signals};

/// Standard Unix exit codes
#[derive(Debug, Clone, Copy)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidUsage = 2,
    SignalInt = 130,  // 128 + SIGINT (2)
    SignalPipe = 141, // 128 + SIGPIPE (13)
    SignalTerm = 143, // 128 + SIGTERM (15)
}

impl ExitCode {
    pub fn exit(self) -> ! {
        process::exit(self as i32)
    }
}

/// Global termination flag polled by the pipeline threads.
pub static SHOULD_TERMINATE: AtomicBool = AtomicBool::new(false);
/// Set when termination was caused by a signal rather than normal EOF.
pub static TERMINATED_BY_SIGNAL: AtomicBool = AtomicBool::new(false);

/// Control messages broadcast by the signal handler to processing components.
#[derive(Debug, Clone)]
pub enum Ctrl {
    Shutdown { immediate: bool },
}

/// Signal handler for graceful shutdown. On the first SIGINT/SIGTERM it
/// raises the termination flag and broadcasts a shutdown message so the
/// pipeline stops submitting work; a second signal (or the grace period
/// expiring) hard-exits with the conventional 128+signo code.
pub struct SignalHandler {
    _handle: thread::JoinHandle<()>,
}

impl SignalHandler {
    pub fn new(ctrl_sender: Sender<Ctrl>) -> Result<Self> {
        #[cfg(unix)]
        let signals_to_handle = vec![SIGINT, SIGPIPE, SIGTERM];

        #[cfg(windows)]
        let signals_to_handle = vec![SIGINT]; // Windows only supports SIGINT reliably

        let mut signals = Signals::new(&signals_to_handle)?;

        let handle = thread::spawn(move || {
            let mut shutdown_count = 0;
            for sig in signals.forever() {
                match sig {
                    SIGINT => {
                        SHOULD_TERMINATE.store(true, Ordering::Relaxed);
                        TERMINATED_BY_SIGNAL.store(true, Ordering::Relaxed);
                        shutdown_count += 1;
                        let immediate = shutdown_count > 1;
                        let _ = ctrl_sender.send(Ctrl::Shutdown { immediate });
                        if immediate {
                            ExitCode::SignalInt.exit();
                        }
                        // Give the pipeline a moment to tear down, then force
                        // the issue rather than hanging on stuck workers.
                        thread::sleep(std::time::Duration::from_millis(500));
                        ExitCode::SignalInt.exit();
                    }
                    #[cfg(unix)]
                    SIGPIPE => {
                        // Broken pipe - exit quietly (normal for Unix pipes)
                        SHOULD_TERMINATE.store(true, Ordering::Relaxed);
                        TERMINATED_BY_SIGNAL.store(true, Ordering::Relaxed);
                        ExitCode::SignalPipe.exit();
                    }
                    #[cfg(unix)]
                    SIGTERM => {
                        eprintln!("shadow-stats: received SIGTERM, shutting down...");
                        SHOULD_TERMINATE.store(true, Ordering::Relaxed);
                        TERMINATED_BY_SIGNAL.store(true, Ordering::Relaxed);
                        let _ = ctrl_sender.send(Ctrl::Shutdown { immediate: true });
                        ExitCode::SignalTerm.exit();
                    }
                    _ => {
                        eprintln!("shadow-stats: received unexpected signal: {}", sig);
                    }
                }
            }
        });

        Ok(SignalHandler { _handle: handle })
    }

    /// Check if we should terminate processing
    pub fn should_terminate() -> bool {
        SHOULD_TERMINATE.load(Ordering::Relaxed)
    }
}

/// Safe wrapper for writing to stdout that handles broken pipes (used by the
/// --tee echo path).
pub struct SafeStdout {
    stdout: io::Stdout,
}

impl Default for SafeStdout {
    fn default() -> Self {
        Self::new()
    }
}

impl SafeStdout {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
        }
    }

    pub fn writeln(&mut self, data: &str) -> Result<()> {
        match writeln!(self.stdout, "{}", data) {
            Ok(()) => Ok(()),
            Err(e) if is_broken_pipe(&e) => {
                // Broken pipe is normal in pipelines - exit quietly
                ExitCode::SignalPipe.exit();
            }
            Err(e) => Err(anyhow::anyhow!("Failed to write to stdout: {}", e)),
        }
    }

    pub fn flush(&mut self) -> Result<()> {
        match self.stdout.flush() {
            Ok(()) => Ok(()),
            Err(e) if is_broken_pipe(&e) => {
                ExitCode::SignalPipe.exit();
            }
            Err(e) => Err(anyhow::anyhow!("Failed to flush stdout: {}", e)),
        }
    }
}

fn is_broken_pipe(e: &io::Error) -> bool {
    #[cfg(unix)]
    {
        e.kind() == io::ErrorKind::BrokenPipe
    }
    #[cfg(windows)]
    {
        e.kind() == io::ErrorKind::BrokenPipe
            || e.raw_os_error() == Some(232) // ERROR_NO_DATA "The pipe is being closed"
            || e.raw_os_error() == Some(109) // ERROR_BROKEN_PIPE "The pipe has been ended"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitCode::Success as i32, 0);
        assert_eq!(ExitCode::GeneralError as i32, 1);
        assert_eq!(ExitCode::InvalidUsage as i32, 2);
        assert_eq!(ExitCode::SignalInt as i32, 130);
        assert_eq!(ExitCode::SignalPipe as i32, 141);
        assert_eq!(ExitCode::SignalTerm as i32, 143);
    }
}
