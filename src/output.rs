//! Serialization of the aggregate to `stats.shadow.json`.
//!
//! The structure is written as pretty JSON (2-space indent). Sorted key
//! order comes for free from the `BTreeMap`-based model, so output is
//! byte-stable across runs for the same input. By default the JSON is piped
//! through an external `xz` process for inline compression; the plain file
//! is written when compression is disabled.

use anyhow::{anyhow, Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::aggregate::SimStats;

/// Output artifact name; gains an `.xz` suffix when compressed.
pub const STATS_FILENAME: &str = "stats.shadow.json";

/// Write the aggregate under `prefix`, returning the path written.
pub fn dump_stats(stats: &SimStats, prefix: &Path, compress: bool) -> Result<PathBuf> {
    fs::create_dir_all(prefix)
        .with_context(|| format!("failed to create output directory '{}'", prefix.display()))?;

    if compress {
        dump_compressed(stats, prefix)
    } else {
        dump_plain(stats, prefix)
    }
}

fn dump_plain(stats: &SimStats, prefix: &Path) -> Result<PathBuf> {
    let path = prefix.join(STATS_FILENAME);
    let file = File::create(&path)
        .with_context(|| format!("failed to create '{}'", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, stats).context("failed to serialize stats")?;
    writer.flush().context("failed to flush stats file")?;
    Ok(path)
}

fn dump_compressed(stats: &SimStats, prefix: &Path) -> Result<PathBuf> {
    let path = prefix.join(format!("{}.xz", STATS_FILENAME));
    let out_file = File::create(&path)
        .with_context(|| format!("failed to create '{}'", path.display()))?;

    let mut child = Command::new("xz")
        .args(["--threads=3", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::from(out_file))
        .spawn()
        .context("failed to spawn xz for output compression")?;

    {
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("xz child has no stdin pipe"))?;
        let mut writer = BufWriter::new(stdin);
        serde_json::to_writer_pretty(&mut writer, stats).context("failed to serialize stats")?;
        writer.flush().context("failed to flush stats into xz")?;
        // Writer drops here, closing the pipe so xz sees EOF
    }

    let status = child.wait().context("failed to wait for xz child")?;
    if !status.success() {
        return Err(anyhow!("xz compression failed with status {}", status));
    }

    Ok(path)
}
