//! Input sources behind a uniform readable line stream.
//!
//! Three sources: stdin (`-`), `.xz` files piped through an external
//! `xz --decompress --stdout` subprocess, and everything else opened through
//! the magic-byte decompression layer. The xz child is a scoped resource:
//! [`LogSource::finish`] waits for it on the normal exit path.

use anyhow::{anyhow, Context, Result};
use std::io::{self, BufRead, BufReader, Read};
use std::process::{Child, ChildStdout, Command, Stdio};

use crate::decompression::DecompressionReader;

/// A readable line stream over the raw or decompressed log input.
pub enum LogSource {
    /// Stdin, possibly gzip/zstd compressed.
    Stdin(DecompressionReader),
    /// A plain, gzip, or zstd log file.
    File(DecompressionReader),
    /// An `.xz` log file streamed through an external xz process.
    XzPipe {
        child: Child,
        reader: BufReader<ChildStdout>,
    },
}

impl std::fmt::Debug for LogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogSource::Stdin(_) => write!(f, "LogSource::Stdin"),
            LogSource::File(_) => write!(f, "LogSource::File"),
            LogSource::XzPipe { .. } => write!(f, "LogSource::XzPipe"),
        }
    }
}

impl LogSource {
    /// Open the input named on the command line: `-` for stdin, an `.xz`
    /// path for subprocess decompression, anything else as a (possibly
    /// gzip/zstd compressed) file.
    pub fn open(path: &str) -> Result<LogSource> {
        if path == "-" {
            return Ok(LogSource::Stdin(DecompressionReader::from_reader(
                io::stdin(),
            )?));
        }

        if path.ends_with(".xz") {
            let mut child = Command::new("xz")
                .args(["--decompress", "--stdout", path])
                .stdout(Stdio::piped())
                .spawn()
                .with_context(|| format!("failed to spawn xz to decompress '{}'", path))?;
            let stdout = child
                .stdout
                .take()
                .ok_or_else(|| anyhow!("xz child has no stdout pipe"))?;
            return Ok(LogSource::XzPipe {
                child,
                reader: BufReader::new(stdout),
            });
        }

        Ok(LogSource::File(DecompressionReader::open(path)?))
    }

    /// Release the source, waiting for any decompression subprocess to exit.
    pub fn finish(self) -> Result<()> {
        match self {
            LogSource::Stdin(_) | LogSource::File(_) => Ok(()),
            LogSource::XzPipe { mut child, reader } => {
                drop(reader);
                let status = child.wait().context("failed to wait for xz child")?;
                if !status.success() {
                    return Err(anyhow!("xz decompression failed with status {}", status));
                }
                Ok(())
            }
        }
    }
}

impl Read for LogSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            LogSource::Stdin(reader) => reader.read(buf),
            LogSource::File(reader) => reader.read(buf),
            LogSource::XzPipe { reader, .. } => reader.read(buf),
        }
    }
}

impl BufRead for LogSource {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self {
            LogSource::Stdin(reader) => reader.fill_buf(),
            LogSource::File(reader) => reader.fill_buf(),
            LogSource::XzPipe { reader, .. } => reader.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self {
            LogSource::Stdin(reader) => reader.consume(amt),
            LogSource::File(reader) => reader.consume(amt),
            LogSource::XzPipe { reader, .. } => reader.consume(amt),
        }
    }
}
