//! Packet-capture analysis.
//!
//! Aggregates byte counts and the observed time span of the packets that
//! carry one protocol layer, and derives throughput from them. Decoding of
//! pcap files into [`PacketRecord`]s lives in [`super::decode`].

use super::types::*;
use crate::utils::ratio::safe_ratio;

/// Duration reported when a capture has no measurable span
pub const DURATION_SENTINEL: f64 = 1.0;

/// Throughput in Mbps for `total_bytes` transferred over `duration` seconds
pub fn throughput_mbps(total_bytes: u64, duration: f64) -> f64 {
    safe_ratio(total_bytes as f64 * 8.0, duration * 1e6, 0.0)
}

/// Analyze a capture, counting only packets tagged with `filter`.
///
/// Timestamps are taken in input order; the capture is assumed to be
/// chronological and is not sorted. A capture with fewer than two matching
/// packets, or whose span is not positive, reports a duration of
/// [`DURATION_SENTINEL`]. A `packet_count` of zero means "no measurement"
/// regardless of the throughput value.
pub fn analyze_capture(packets: &[PacketRecord], filter: Protocol) -> CaptureSummary {
    let mut total_bytes: u64 = 0;
    let mut packet_count: u64 = 0;
    let mut first_timestamp: Option<SimTime> = None;
    let mut last_timestamp: Option<SimTime> = None;

    for packet in packets.iter().filter(|p| p.has_layer(filter)) {
        total_bytes += packet.length;
        packet_count += 1;
        if first_timestamp.is_none() {
            first_timestamp = Some(packet.timestamp);
        }
        last_timestamp = Some(packet.timestamp);
    }

    let duration = match (first_timestamp, last_timestamp) {
        (Some(first), Some(last)) if packet_count >= 2 && last > first => last - first,
        (Some(first), Some(last)) if last < first => {
            log::debug!("Capture timestamps run backwards ({} -> {}), using sentinel duration", first, last);
            DURATION_SENTINEL
        }
        _ => DURATION_SENTINEL,
    };

    CaptureSummary {
        total_bytes,
        packet_count,
        duration,
        throughput_mbps: throughput_mbps(total_bytes, duration),
    }
}
