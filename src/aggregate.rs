//! Aggregated statistics model and the fold that builds it.
//!
//! The parser emits one small [`LineStats`] fragment per recognized heartbeat
//! line; this module owns the accumulated [`SimStats`] structure and the
//! merge rules: tick samples are first-write-wins across the whole run,
//! traffic byte counters are summed and never overwritten, and the
//! [`RunSummary`] scalars only ever grow. All maps are `BTreeMap` so the
//! serialized output is byte-stable regardless of insertion order.

use serde::Serialize;
use std::collections::BTreeMap;

/// Byte-counter categories present for every node in both directions.
///
/// A packet is a data packet if it carries a payload and a control packet
/// otherwise; each packet has a header and optionally a payload, and is
/// either a first transmission or a retransmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrafficLabel {
    Total,
    ControlHeader,
    ControlHeaderRetrans,
    DataHeader,
    DataPayload,
    DataHeaderRetrans,
    DataPayloadRetrans,
}

impl TrafficLabel {
    pub const ALL: [TrafficLabel; 7] = [
        TrafficLabel::Total,
        TrafficLabel::ControlHeader,
        TrafficLabel::ControlHeaderRetrans,
        TrafficLabel::DataHeader,
        TrafficLabel::DataPayload,
        TrafficLabel::DataHeaderRetrans,
        TrafficLabel::DataPayloadRetrans,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TrafficLabel::Total => "bytes_total",
            TrafficLabel::ControlHeader => "bytes_control_header",
            TrafficLabel::ControlHeaderRetrans => "bytes_control_header_retrans",
            TrafficLabel::DataHeader => "bytes_data_header",
            TrafficLabel::DataPayload => "bytes_data_payload",
            TrafficLabel::DataHeaderRetrans => "bytes_data_header_retrans",
            TrafficLabel::DataPayloadRetrans => "bytes_data_payload_retrans",
        }
    }
}

/// Resource usage observed at one simulated second.
///
/// `maxrss_gib` is `-1.0` when the heartbeat line carried no usable maxrss
/// field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TickSample {
    pub maxrss_gib: f64,
    pub time_seconds: f64,
}

/// Per-second byte counters for one direction of one node.
///
/// Fields are declared in lexicographic order so the serialized object keys
/// come out sorted, matching the ordering of the surrounding maps.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DirectionCounters {
    pub bytes_control_header: BTreeMap<u64, u64>,
    pub bytes_control_header_retrans: BTreeMap<u64, u64>,
    pub bytes_data_header: BTreeMap<u64, u64>,
    pub bytes_data_header_retrans: BTreeMap<u64, u64>,
    pub bytes_data_payload: BTreeMap<u64, u64>,
    pub bytes_data_payload_retrans: BTreeMap<u64, u64>,
    pub bytes_total: BTreeMap<u64, u64>,
}

impl DirectionCounters {
    pub fn counts(&self, label: TrafficLabel) -> &BTreeMap<u64, u64> {
        match label {
            TrafficLabel::Total => &self.bytes_total,
            TrafficLabel::ControlHeader => &self.bytes_control_header,
            TrafficLabel::ControlHeaderRetrans => &self.bytes_control_header_retrans,
            TrafficLabel::DataHeader => &self.bytes_data_header,
            TrafficLabel::DataPayload => &self.bytes_data_payload,
            TrafficLabel::DataHeaderRetrans => &self.bytes_data_header_retrans,
            TrafficLabel::DataPayloadRetrans => &self.bytes_data_payload_retrans,
        }
    }

    fn counts_mut(&mut self, label: TrafficLabel) -> &mut BTreeMap<u64, u64> {
        match label {
            TrafficLabel::Total => &mut self.bytes_total,
            TrafficLabel::ControlHeader => &mut self.bytes_control_header,
            TrafficLabel::ControlHeaderRetrans => &mut self.bytes_control_header_retrans,
            TrafficLabel::DataHeader => &mut self.bytes_data_header,
            TrafficLabel::DataPayload => &mut self.bytes_data_payload,
            TrafficLabel::DataHeaderRetrans => &mut self.bytes_data_header_retrans,
            TrafficLabel::DataPayloadRetrans => &mut self.bytes_data_payload_retrans,
        }
    }

    /// Add one line's worth of byte counts, defaulting missing seconds to
    /// zero. Indexing of `deltas` follows `TrafficLabel::ALL`.
    fn apply(&mut self, second: u64, deltas: &[u64; 7]) {
        for (label, delta) in TrafficLabel::ALL.iter().zip(deltas.iter()) {
            *self.counts_mut(*label).entry(second).or_insert(0) += delta;
        }
    }
}

/// Both directions of traffic for one node. Every label map exists from the
/// moment the node is first seen, even if it only ever holds zeros.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodeTraffic {
    pub recv: DirectionCounters,
    pub send: DirectionCounters,
}

/// Byte-count increments extracted from a single traffic-heartbeat line.
#[derive(Debug, Clone, PartialEq)]
pub struct TrafficDelta {
    pub name: String,
    pub second: u64,
    pub recv: [u64; 7],
    pub send: [u64; 7],
}

/// The minimal aggregate contribution of one recognized line: at most one
/// tick sample or one node's per-second increments.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Tick { second: u64, sample: TickSample },
    Traffic(TrafficDelta),
}

/// Per-line parse result handed from the workers to the reducer.
#[derive(Debug, Clone, PartialEq)]
pub struct LineStats {
    pub peak_maxrss_gib: f64,
    pub peak_hours: f64,
    pub fragment: Fragment,
}

/// Running maxima across all heartbeat lines of either kind.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunSummary {
    pub peak_maxrss_gib: f64,
    pub peak_hours: f64,
}

impl RunSummary {
    fn observe(&mut self, maxrss_gib: f64, hours: f64) {
        if maxrss_gib > self.peak_maxrss_gib {
            self.peak_maxrss_gib = maxrss_gib;
        }
        if hours > self.peak_hours {
            self.peak_hours = hours;
        }
    }
}

/// The accumulated result for a whole run: tick samples keyed by simulated
/// second and traffic counters keyed by node name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimStats {
    pub nodes: BTreeMap<String, NodeTraffic>,
    pub ticks: BTreeMap<u64, TickSample>,
}

impl SimStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one line fragment into the aggregate.
    pub fn fold(&mut self, summary: &mut RunSummary, stats: LineStats) {
        summary.observe(stats.peak_maxrss_gib, stats.peak_hours);

        match stats.fragment {
            Fragment::Tick { second, sample } => {
                // First sample for a second wins for the entire run.
                self.ticks.entry(second).or_insert(sample);
            }
            Fragment::Traffic(delta) => {
                let node = self.nodes.entry(delta.name).or_default();
                node.recv.apply(delta.second, &delta.recv);
                node.send.apply(delta.second, &delta.send);
            }
        }
    }

    /// Fold a whole batch of fragments in order.
    pub fn fold_batch<I>(&mut self, summary: &mut RunSummary, batch: I)
    where
        I: IntoIterator<Item = LineStats>,
    {
        for stats in batch {
            self.fold(summary, stats);
        }
    }
}
