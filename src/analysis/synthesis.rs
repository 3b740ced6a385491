//! Combining capture and trace summaries into per-scenario metrics.

use super::types::*;
use crate::utils::ratio::safe_ratio;

/// Build the metrics record for one scenario.
///
/// Average latency is the capture span divided by the packet count. This is
/// a coarse proxy for delay, not a per-packet latency measurement: the inputs
/// carry no send/receive correlation. It is 0 when no packet matched.
pub fn synthesize(scenario: &str, capture: CaptureSummary, trace: TraceSummary) -> ScenarioMetrics {
    let average_latency = if capture.packet_count > 0 {
        safe_ratio(capture.duration, capture.packet_count as f64, 0.0)
    } else {
        0.0
    };

    ScenarioMetrics {
        scenario: scenario.to_string(),
        throughput_mbps: capture.throughput_mbps,
        pdr: trace.pdr,
        average_latency,
        packet_loss: trace.packet_loss(),
        packet_count: capture.packet_count,
        total_bytes: capture.total_bytes,
        has_measurement: capture.packet_count > 0,
    }
}
