//! Classification and parsing of Shadow heartbeat log lines.
//!
//! Two message kinds are recognized, each by a fixed substring marker:
//! resource heartbeats (`slave_heartbeat`) carrying per-tick wall-clock and
//! memory samples, and traffic heartbeats (`shadow-heartbeat`) carrying
//! per-node byte counters. Everything else is `Unrecognized` and silently
//! skipped. Lines that match a marker but fall short of the mandatory field
//! count are skipped the same way; a malformed numeric inside an otherwise
//! well-formed line is an error and aborts the run.

use anyhow::{Context, Result};

use crate::aggregate::{Fragment, LineStats, TickSample, TrafficDelta};
use crate::timestamp::{sim_second, timestamp_to_seconds};

/// Marker for resource heartbeats emitted by the Shadow slave process.
pub const RESOURCE_MARKER: &str = "slave_heartbeat";
/// Marker for node-level traffic heartbeats.
pub const TRAFFIC_MARKER: &str = "shadow-heartbeat";

/// Tag at field 8 that scopes a traffic heartbeat to a node.
const NODE_TAG: &str = "[node]";

/// Resource heartbeats have carried two layouts over Shadow's history.
/// The variant decides where the simulated clock and the maxrss field live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResourceFormat {
    /// Field 2 is a real `H:MM:SS.sss` simulated timestamp; maxrss at 13.
    Legacy,
    /// Field 2 is `n/a`; the simulated clock is integer nanoseconds in
    /// field 12 and maxrss moves to index 16.
    NanosClock,
    /// Field 2 is `n/a` and field 12 is a getrusage diagnostic: no
    /// simulated time is available, maxrss stays at 13.
    NoSimTime,
}

impl ResourceFormat {
    fn detect(parts: &[&str]) -> ResourceFormat {
        if parts[2] != "n/a" {
            ResourceFormat::Legacy
        } else if parts[12].contains("getrusage") {
            ResourceFormat::NoSimTime
        } else {
            ResourceFormat::NanosClock
        }
    }

    fn maxrss_index(self) -> usize {
        match self {
            ResourceFormat::Legacy | ResourceFormat::NoSimTime => 13,
            ResourceFormat::NanosClock => 16,
        }
    }
}

/// Which message kind a raw line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Resource,
    Traffic,
    Unrecognized,
}

/// Single classification step; the kind-specific extractors below consume it.
pub fn classify(line: &str) -> LineKind {
    if line.contains(RESOURCE_MARKER) {
        LineKind::Resource
    } else if line.contains(TRAFFIC_MARKER) {
        LineKind::Traffic
    } else {
        LineKind::Unrecognized
    }
}

/// Parse one raw line. `Ok(None)` means the line is not applicable
/// (unrecognized, or recognized but missing its mandatory envelope); `Err`
/// means a recognized line carried a malformed field and the run must abort.
pub fn parse_line(line: &str) -> Result<Option<LineStats>> {
    match classify(line) {
        LineKind::Resource => parse_resource(line),
        LineKind::Traffic => parse_traffic(line),
        LineKind::Unrecognized => Ok(None),
    }
}

fn parse_resource(line: &str) -> Result<Option<LineStats>> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 14 {
        return Ok(None);
    }

    let real_seconds = timestamp_to_seconds(parts[0])?;

    let format = ResourceFormat::detect(&parts);
    let sim_seconds = match format {
        ResourceFormat::Legacy => timestamp_to_seconds(parts[2])?,
        ResourceFormat::NanosClock => {
            let nanos: i64 = parts[12]
                .parse()
                .with_context(|| format!("bad nanosecond clock field '{}'", parts[12]))?;
            nanos as f64 / 1_000_000_000.0
        }
        ResourceFormat::NoSimTime => 0.0,
    };
    let second = sim_second(sim_seconds);

    let maxrss_field = parts
        .get(format.maxrss_index())
        .with_context(|| format!("resource heartbeat missing field {}", format.maxrss_index()))?;
    let maxrss_gib = if maxrss_field.contains("maxrss") {
        let value = maxrss_field
            .splitn(2, '=')
            .nth(1)
            .with_context(|| format!("maxrss field '{}' has no value", maxrss_field))?;
        value
            .parse::<f64>()
            .with_context(|| format!("bad maxrss value '{}'", value))?
    } else {
        // Sentinel meaning "memory unknown for this tick"
        -1.0
    };

    Ok(Some(LineStats {
        peak_maxrss_gib: maxrss_gib.max(0.0),
        peak_hours: real_seconds / 3600.0,
        fragment: Fragment::Tick {
            second,
            sample: TickSample {
                maxrss_gib,
                time_seconds: real_seconds,
            },
        },
    }))
}

/// Byte-count positions within a comma-separated counter group, in
/// `TrafficLabel::ALL` order. The interleaved packet counts are ignored.
const BYTE_INDICES: [usize; 7] = [1, 3, 5, 7, 8, 10, 11];

fn parse_counter_group(group: &str) -> Result<[u64; 7]> {
    let values: Vec<&str> = group.split(',').collect();
    let mut counts = [0u64; 7];
    for (slot, &index) in counts.iter_mut().zip(BYTE_INDICES.iter()) {
        let raw = values
            .get(index)
            .with_context(|| format!("counter group '{}' missing value {}", group, index))?;
        *slot = raw
            .parse()
            .with_context(|| format!("bad byte count '{}' in counter group", raw))?;
    }
    Ok(counts)
}

fn parse_traffic(line: &str) -> Result<Option<LineStats>> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 10 || parts[8] != NODE_TAG {
        return Ok(None);
    }

    let real_seconds = timestamp_to_seconds(parts[0])?;
    let sim_seconds = timestamp_to_seconds(parts[2])?;
    let second = sim_second(sim_seconds);

    // eg: [webclient2-11.0.5.99]
    let name = parts[4]
        .trim_start_matches('[')
        .trim_end_matches(']')
        .to_string();

    // Five semicolon-separated groups: node stats, local in/out, remote in/out.
    let groups: Vec<&str> = parts[9].split(';').collect();
    let remote_in = groups
        .get(3)
        .context("traffic heartbeat missing remote-in counter group")?;
    let remote_out = groups
        .get(4)
        .context("traffic heartbeat missing remote-out counter group")?;

    let recv = parse_counter_group(remote_in)?;
    let send = parse_counter_group(remote_out)?;

    Ok(Some(LineStats {
        peak_maxrss_gib: 0.0,
        peak_hours: real_seconds / 3600.0,
        fragment: Fragment::Traffic(TrafficDelta {
            name,
            second,
            recv,
            send,
        }),
    }))
}
