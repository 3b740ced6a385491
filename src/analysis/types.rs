//! Core data types for scenario metrics analysis.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Capture timestamp in seconds (fractional)
pub type SimTime = f64;

/// Protocol layer tags attached to a captured packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Ethernet II link layer
    Ethernet,
    /// IEEE 802.11 link layer (with or without radiotap)
    #[value(alias = "wifi")]
    #[serde(alias = "wifi")]
    Ieee80211,
    /// ARP carried over a link layer
    Arp,
    /// IPv4 network layer
    #[value(alias = "ip")]
    #[serde(alias = "ip")]
    Ipv4,
    /// IPv6 network layer
    Ipv6,
    Tcp,
    Udp,
    /// ICMPv4 or ICMPv6
    Icmp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Protocol::Ethernet => "Ethernet",
            Protocol::Ieee80211 => "802.11",
            Protocol::Arp => "ARP",
            Protocol::Ipv4 => "IPv4",
            Protocol::Ipv6 => "IPv6",
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
            Protocol::Icmp => "ICMP",
        };
        write!(f, "{}", name)
    }
}

/// A single captured packet, reduced to what the analyzer needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketRecord {
    pub timestamp: SimTime,
    /// Captured length in bytes, as stored in the capture record
    pub length: u64,
    pub layers: Vec<Protocol>,
}

impl PacketRecord {
    /// Build a packet record, rejecting timestamps that cannot be ordered
    pub fn new(timestamp: SimTime, length: u64, layers: Vec<Protocol>) -> Result<Self, ParseError> {
        if !timestamp.is_finite() || timestamp < 0.0 {
            return Err(ParseError::InvalidTimestamp { value: timestamp });
        }
        Ok(Self { timestamp, length, layers })
    }

    /// Whether this packet carries the given protocol layer
    pub fn has_layer(&self, protocol: Protocol) -> bool {
        self.layers.contains(&protocol)
    }
}

/// Classification of one trace line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceEvent {
    Sent,
    Received,
    /// Anything else, including empty and malformed lines
    Other,
}

/// Substring markers identifying send and receive events in a trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceMarkers {
    pub sent: String,
    pub received: String,
}

impl Default for TraceMarkers {
    fn default() -> Self {
        // ns-3 ASCII trace: "+" enqueue, "-" dequeue
        Self {
            sent: "+ ".to_string(),
            received: "- ".to_string(),
        }
    }
}

/// Aggregate of one capture after protocol filtering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaptureSummary {
    pub total_bytes: u64,
    pub packet_count: u64,
    /// Seconds between first and last matching packet, or 1.0 when undefined
    pub duration: f64,
    pub throughput_mbps: f64,
}

/// Send/receive tallies of one trace file
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceSummary {
    pub sent: u64,
    pub received: u64,
    /// Lines classified as neither sent nor received
    pub other: u64,
    /// received / sent * 100, or 0 when nothing was sent
    pub pdr: f64,
}

impl TraceSummary {
    /// Packet loss as 100 - PDR, or 0 when nothing was sent
    pub fn packet_loss(&self) -> f64 {
        if self.sent == 0 {
            0.0
        } else {
            100.0 - self.pdr
        }
    }
}

/// Derived metrics for one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioMetrics {
    pub scenario: String,
    pub throughput_mbps: f64,
    pub pdr: f64,
    /// Capture span divided by packet count (seconds). Approximation only.
    pub average_latency: f64,
    pub packet_loss: f64,
    pub packet_count: u64,
    pub total_bytes: u64,
    /// False when no packet matched the protocol filter
    pub has_measurement: bool,
}

/// Metric dimensions compared across scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Throughput,
    Pdr,
    Latency,
    PacketLoss,
}

/// Time unit a latency column is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyUnit {
    Seconds,
    Milliseconds,
}

impl MetricKind {
    /// Label for per-scenario metrics, where latency is in simulation seconds
    pub fn label(&self) -> &'static str {
        self.label_in(LatencyUnit::Seconds)
    }

    pub fn label_in(&self, latency: LatencyUnit) -> &'static str {
        match (self, latency) {
            (MetricKind::Throughput, _) => "Throughput (Mbps)",
            (MetricKind::Pdr, _) => "PDR (%)",
            (MetricKind::Latency, LatencyUnit::Seconds) => "Latency (s)",
            (MetricKind::Latency, LatencyUnit::Milliseconds) => "Latency (ms)",
            (MetricKind::PacketLoss, _) => "Packet Loss (%)",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedValue {
    pub scenario: String,
    pub value: f64,
}

/// One metric dimension, normalized to [0, 1] across scenarios
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedDimension {
    pub metric: MetricKind,
    pub values: Vec<NormalizedValue>,
}

impl NormalizedDimension {
    pub fn get(&self, scenario: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|v| v.scenario == scenario)
            .map(|v| v.value)
    }
}

/// Normalized throughput, PDR and latency for every scenario in one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedComparison {
    pub throughput: NormalizedDimension,
    pub pdr: NormalizedDimension,
    pub latency: NormalizedDimension,
}

impl NormalizedComparison {
    pub fn dimension(&self, metric: MetricKind) -> Option<&NormalizedDimension> {
        match metric {
            MetricKind::Throughput => Some(&self.throughput),
            MetricKind::Pdr => Some(&self.pdr),
            MetricKind::Latency => Some(&self.latency),
            MetricKind::PacketLoss => None,
        }
    }

    pub fn dimensions(&self) -> [&NormalizedDimension; 3] {
        [&self.throughput, &self.pdr, &self.latency]
    }

    pub fn scenario_count(&self) -> usize {
        self.throughput.values.len()
    }
}

/// One row of the topology comparison table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyRecord {
    pub topology: String,
    pub packet_loss: f64,
    pub latency_ms: f64,
    pub throughput_mbps: f64,
    pub pdr: Option<f64>,
}

/// One sample of the traffic-flow comparison table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowSample {
    #[serde(rename = "Flow Type")]
    pub flow_type: String,
    #[serde(rename = "Throughput (Mbps)")]
    pub throughput_mbps: f64,
    #[serde(rename = "Latency (ms)")]
    pub latency_ms: f64,
    #[serde(rename = "Packet Loss (%)")]
    pub packet_loss: f64,
}

/// Samples of one flow type, in file order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowSeries {
    pub flow_type: String,
    pub throughput_mbps: Vec<f64>,
    pub latency_ms: Vec<f64>,
    pub packet_loss: Vec<f64>,
}

/// Scenario left out of a comparison because its inputs could not be parsed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedScenario {
    pub scenario: String,
    pub reason: String,
}

/// Metadata about the analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub analysis_timestamp: String,
    pub protocol_filter: Protocol,
    pub scenario_count: usize,
    pub skipped_count: usize,
}

/// Everything handed to the presentation layer for one scenario comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub metadata: ReportMetadata,
    pub scenarios: Vec<ScenarioMetrics>,
    pub normalized: NormalizedComparison,
    pub skipped: Vec<SkippedScenario>,
}

/// Structural problems in capture, trace or table inputs
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid capture file {path}: {message}")]
    Capture { path: String, message: String },

    #[error("Invalid packet timestamp: {value}")]
    InvalidTimestamp { value: f64 },

    #[error("Invalid metrics table row {line}: {message}")]
    Table { line: u64, message: String },
}
