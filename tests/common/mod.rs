// tests/common/mod.rs
// Shared test utilities for integration tests
#![allow(dead_code)]

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use tempfile::NamedTempFile;

/// Sample log covering both heartbeat flavors plus noise lines. Parsing it
/// should produce one tick at simulated second 2 and one node with recv/send
/// counters at that second.
pub const SAMPLE_LOG: &str = "\
00:00:01.000 [shadow] 00:00:00.000 [info] [slave-main] starting up\n\
00:00:05.100 [shadow] 00:00:02.000 [info] [slave-main] slave_heartbeat: alloc=10 dealloc=2 tasks=5 queue=0 workers=4 events=99 clock=valid maxrss=1.500\n\
00:00:05.100 [shadow] 00:00:02.000 [info] [clientA-1.2.3.4] shadow-heartbeat n/a n/a [node] 1,2;3,4;5,6;10,200,0,30,0,40,50,0,0,0,0,0;10,100,0,20,0,30,10,0,0,0,0,0\n\
00:00:09.000 [shadow] 00:00:02.000 [info] [slave-main] slave_heartbeat: alloc=11 dealloc=3 tasks=5 queue=0 workers=4 events=99 clock=valid maxrss=9.000\n\
00:00:09.000 [shadow] shutting down\n";

fn binary_path() -> &'static str {
    // Use the built binary directly instead of cargo run to avoid compilation output
    if cfg!(debug_assertions) {
        "./target/debug/shadow-stats"
    } else {
        "./target/release/shadow-stats"
    }
}

/// Helper function to run shadow-stats with given arguments and input via stdin
pub fn run_shadow_stats_with_input(args: &[&str], input: &str) -> (String, String, i32) {
    let mut cmd = Command::new(binary_path())
        .args(args)
        .arg("-")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to start shadow-stats");

    // Write input to stdin
    if let Some(stdin) = cmd.stdin.as_mut() {
        stdin
            .write_all(input.as_bytes())
            .expect("Failed to write to stdin");
    }

    let output = cmd.wait_with_output().expect("Failed to read output");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

/// Like [`run_shadow_stats_with_input`] but for raw (possibly compressed)
/// stdin bytes.
pub fn run_shadow_stats_with_bytes(args: &[&str], input: &[u8]) -> (String, String, i32) {
    let mut cmd = Command::new(binary_path())
        .args(args)
        .arg("-")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to start shadow-stats");

    if let Some(stdin) = cmd.stdin.as_mut() {
        stdin.write_all(input).expect("Failed to write to stdin");
    }

    let output = cmd.wait_with_output().expect("Failed to read output");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

/// Helper function to run shadow-stats on a temporary log file
pub fn run_shadow_stats_with_file(args: &[&str], file_content: &str) -> (String, String, i32) {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file
        .write_all(file_content.as_bytes())
        .expect("Failed to write to temp file");

    let mut full_args = args.to_vec();
    let path = temp_file.path().to_str().unwrap();
    full_args.push(path);

    let output = Command::new(binary_path())
        .args(&full_args)
        .output()
        .expect("Failed to execute shadow-stats");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

/// Parse the aggregate file dropped by a run with `-p <dir> --no-compress`.
pub fn read_stats_json(dir: &Path) -> serde_json::Value {
    let path = dir.join("stats.shadow.json");
    let contents = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
    serde_json::from_str(&contents).expect("stats file should be valid JSON")
}
