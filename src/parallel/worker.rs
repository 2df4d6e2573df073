//! Worker thread: parses batches of raw lines into aggregate fragments.

use anyhow::Result;
use crossbeam_channel::{select, Receiver, Sender};

use crate::heartbeat::parse_line;
use crate::platform::Ctrl;

use super::types::{Batch, BatchResult};

/// Pulls batches off the shared work channel and parses every line. A parse
/// error on a recognized heartbeat propagates and aborts the run; shutdown
/// messages stop the worker before the next batch.
pub(crate) fn worker_thread(
    _worker_id: usize,
    work_receiver: Receiver<Batch>,
    result_sender: Sender<BatchResult>,
    ctrl_rx: Receiver<Ctrl>,
) -> Result<()> {
    loop {
        select! {
            recv(ctrl_rx) -> msg => {
                match msg {
                    Ok(Ctrl::Shutdown { .. }) | Err(_) => break,
                }
            }
            recv(work_receiver) -> msg => {
                match msg {
                    Ok(batch) => {
                        if !process_batch(batch, &result_sender)? {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        }
    }

    Ok(())
}

/// Parse one batch; returns false when the result channel is gone.
fn process_batch(batch: Batch, result_sender: &Sender<BatchResult>) -> Result<bool> {
    let lines_read = batch.lines.len();
    let mut parsed = Vec::with_capacity(lines_read / 4);

    for line in &batch.lines {
        if let Some(stats) = parse_line(line)? {
            parsed.push(stats);
        }
    }

    let result = BatchResult {
        batch_id: batch.id,
        parsed,
        lines_read,
    };

    Ok(result_sender.send(result).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn test_process_batch_skips_unrecognized_lines() {
        let (sender, receiver) = unbounded();
        let batch = Batch {
            id: 7,
            lines: vec![
                "some unrelated log line".to_string(),
                "another one".to_string(),
            ],
        };

        assert!(process_batch(batch, &sender).unwrap());
        let result = receiver.recv().unwrap();
        assert_eq!(result.batch_id, 7);
        assert_eq!(result.lines_read, 2);
        assert!(result.parsed.is_empty());
    }
}
