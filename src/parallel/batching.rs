//! I/O reader and batcher threads.

use anyhow::Result;
use crossbeam_channel::{Receiver, Sender};
use std::io::BufRead;

use crate::platform::{Ctrl, SafeStdout};
use crate::readers::LogSource;

use super::types::{Batch, LineMessage};

/// Reads lines from the input source and streams them to the batcher.
/// On the normal path the source is released (waiting for any decompression
/// subprocess); on cancellation the process is about to exit, so the source
/// is intentionally abandoned and only the pool gets torn down.
pub(crate) fn io_reader_thread(
    mut source: LogSource,
    line_sender: Sender<LineMessage>,
    ctrl_rx: Receiver<Ctrl>,
) -> Result<()> {
    let mut buffer = String::new();
    loop {
        if let Ok(Ctrl::Shutdown { .. }) = ctrl_rx.try_recv() {
            let _ = line_sender.send(LineMessage::Eof);
            return Ok(());
        }

        buffer.clear();
        match source.read_line(&mut buffer) {
            Ok(0) => {
                let _ = line_sender.send(LineMessage::Eof);
                break;
            }
            Ok(_) => {
                let line = buffer.trim_end().to_string();
                if line_sender.send(LineMessage::Line(line)).is_err() {
                    break;
                }
            }
            Err(e) => {
                let _ = line_sender.send(LineMessage::Error(e));
                break;
            }
        }
    }

    source.finish()
}

/// Collects lines into fixed-size batches for the worker pool, optionally
/// echoing each decompressed line back to stdout (--tee).
pub(crate) fn batcher_thread(
    line_receiver: Receiver<LineMessage>,
    batch_sender: Sender<Batch>,
    batch_size: usize,
    tee: bool,
    ctrl_rx: Receiver<Ctrl>,
) -> Result<usize> {
    let mut batch_id = 0u64;
    let mut current_batch = Vec::with_capacity(batch_size);
    let mut line_num = 0usize;
    let mut stdout = SafeStdout::new();

    loop {
        if let Ok(Ctrl::Shutdown { .. }) = ctrl_rx.try_recv() {
            break;
        }

        match line_receiver.recv() {
            Ok(LineMessage::Line(line)) => {
                line_num += 1;
                if tee {
                    stdout.writeln(&line)?;
                }

                current_batch.push(line);
                if current_batch.len() >= batch_size {
                    send_batch(&batch_sender, &mut current_batch, &mut batch_id)?;
                }
            }
            Ok(LineMessage::Error(error)) => {
                return Err(anyhow::Error::from(error).context("while reading log input"));
            }
            Ok(LineMessage::Eof) | Err(_) => {
                send_batch(&batch_sender, &mut current_batch, &mut batch_id)?;
                break;
            }
        }
    }

    if tee {
        stdout.flush()?;
    }

    Ok(line_num)
}

fn send_batch(
    batch_sender: &Sender<Batch>,
    current_batch: &mut Vec<String>,
    batch_id: &mut u64,
) -> Result<()> {
    if current_batch.is_empty() {
        return Ok(());
    }

    let batch = Batch {
        id: *batch_id,
        lines: std::mem::take(current_batch),
    };
    *batch_id += 1;

    if batch_sender.send(batch).is_err() {
        return Err(anyhow::anyhow!("batch channel closed"));
    }

    Ok(())
}
