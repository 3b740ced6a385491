//! Report rendering for scenario comparisons.
//!
//! Produces both JSON and human-readable text. Reports are returned as
//! strings and printed by the caller; nothing is written to disk.

use color_eyre::eyre::{Context, Result};

use super::tabular::{mean, TopologyTable};
use super::types::*;

/// Render a comparison report as pretty JSON
pub fn render_json_report(report: &ComparisonReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")
}

fn header(lines: &mut Vec<String>, title: &str) {
    lines.push("=".repeat(80));
    lines.push(format!("{:^80}", title));
    lines.push("=".repeat(80));
    lines.push(String::new());
}

/// Render a comparison report as text
pub fn render_text_report(report: &ComparisonReport) -> String {
    let mut lines: Vec<String> = Vec::new();

    header(&mut lines, "NETWORK SCENARIO METRICS COMPARISON");

    lines.push(format!("Analysis Date: {}", report.metadata.analysis_timestamp));
    lines.push(format!("Protocol Filter: {}", report.metadata.protocol_filter));
    lines.push(format!("Scenarios Analyzed: {}", report.metadata.scenario_count));
    if report.metadata.skipped_count > 0 {
        lines.push(format!("Scenarios Skipped: {}", report.metadata.skipped_count));
    }
    lines.push(String::new());

    if !report.scenarios.is_empty() {
        header(&mut lines, "RAW METRICS");
        lines.push(format!(
            "{:<24} {:>16} {:>10} {:>14} {:>10} {:>10}",
            "Scenario", "Throughput(Mbps)", "PDR(%)", "Latency(s)", "Loss(%)", "Packets"
        ));
        for m in &report.scenarios {
            lines.push(format!(
                "{:<24} {:>16.6} {:>10.2} {:>14.6} {:>10.2} {:>10}",
                truncate(&m.scenario, 24),
                m.throughput_mbps,
                m.pdr,
                m.average_latency,
                m.packet_loss,
                m.packet_count
            ));
        }
        let unmeasured: Vec<&str> = report
            .scenarios
            .iter()
            .filter(|m| !m.has_measurement)
            .map(|m| m.scenario.as_str())
            .collect();
        if !unmeasured.is_empty() {
            lines.push(String::new());
            lines.push(format!(
                "No matching packets (throughput/latency not measured): {}",
                unmeasured.join(", ")
            ));
        }
        lines.push(String::new());
        lines.push("Latency is the capture span divided by packet count, an approximation.".to_string());
        lines.push(String::new());

        header(&mut lines, "NORMALIZED METRICS (0 = lowest, 1 = highest)");
        lines.push(format!(
            "{:<24} {:>12} {:>12} {:>12}",
            "Scenario", "Throughput", "PDR", "Latency"
        ));
        let n = &report.normalized;
        for (i, m) in report.scenarios.iter().enumerate() {
            let value = |dim: &NormalizedDimension| dim.values.get(i).map(|v| v.value).unwrap_or(0.0);
            lines.push(format!(
                "{:<24} {:>12.3} {:>12.3} {:>12.3}",
                truncate(&m.scenario, 24),
                value(&n.throughput),
                value(&n.pdr),
                value(&n.latency)
            ));
        }
        lines.push(String::new());
    }

    if !report.skipped.is_empty() {
        header(&mut lines, "SKIPPED SCENARIOS");
        for skipped in &report.skipped {
            lines.push(format!("  {}: {}", skipped.scenario, skipped.reason));
        }
        lines.push(String::new());
    }

    lines.push("=".repeat(80));
    lines.join("\n")
}

/// Render the topology comparison table as text
pub fn render_topology_report(table: &TopologyTable) -> String {
    let mut lines: Vec<String> = Vec::new();
    header(&mut lines, "COMPARISON OF NETWORK METRICS ACROSS TOPOLOGIES");

    let has_pdr = table.has_pdr();
    let mut columns = format!(
        "{:<16} {:>16} {:>12} {:>18}",
        "Topology", "PacketLoss(%)", "Latency(ms)", "Throughput(Mbps)"
    );
    if has_pdr {
        columns.push_str(&format!(" {:>10}", "PDR(%)"));
    }
    lines.push(columns);

    for r in &table.records {
        let mut row = format!(
            "{:<16} {:>16.3} {:>12.3} {:>18.3}",
            truncate(&r.topology, 16),
            r.packet_loss,
            r.latency_ms,
            r.throughput_mbps
        );
        if let (true, Some(pdr)) = (has_pdr, r.pdr) {
            row.push_str(&format!(" {:>10.3}", pdr));
        }
        lines.push(row);
    }
    lines.push(String::new());

    if !has_pdr {
        lines.push("PDR(%) column not found in the data; PDR series omitted.".to_string());
        lines.push(String::new());
    }

    lines.push("Normalized (0 = lowest, 1 = highest):".to_string());
    let metrics = [
        MetricKind::PacketLoss,
        MetricKind::Latency,
        MetricKind::Throughput,
        MetricKind::Pdr,
    ];
    let labels = table.labels();
    for metric in metrics {
        let Some(values) = table.normalized(metric) else {
            continue;
        };
        let cells: Vec<String> = labels
            .iter()
            .zip(values)
            .map(|(label, v)| format!("{}={:.3}", label, v))
            .collect();
        lines.push(format!("  {:<18} {}", metric.label_in(LatencyUnit::Milliseconds), cells.join("  ")));
    }
    lines.push(String::new());
    lines.push("=".repeat(80));

    lines.join("\n")
}

/// Render per-flow-type series as text
pub fn render_flow_report(series: &[FlowSeries]) -> String {
    let mut lines: Vec<String> = Vec::new();
    header(&mut lines, "COMPARISON OF THROUGHPUT, LATENCY, AND PACKET LOSS");

    for s in series {
        lines.push(format!("{} ({} samples)", s.flow_type, s.throughput_mbps.len()));
        lines.push(format!(
            "  Throughput (Mbps): mean {:.4}  [{}]",
            mean(&s.throughput_mbps),
            join_values(&s.throughput_mbps)
        ));
        lines.push(format!(
            "  Latency (ms):      mean {:.4}  [{}]",
            mean(&s.latency_ms),
            join_values(&s.latency_ms)
        ));
        lines.push(format!(
            "  Packet Loss (%):   mean {:.4}  [{}]",
            mean(&s.packet_loss),
            join_values(&s.packet_loss)
        ));
        lines.push(String::new());
    }

    lines.push("=".repeat(80));
    lines.join("\n")
}

fn join_values(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format!("{}", v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Shorten long scenario names for column display
fn truncate(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        name.to_string()
    } else {
        name.chars().take(width - 1).chain(std::iter::once('~')).collect()
    }
}

/// Print a summary to stdout
pub fn print_summary(report: &ComparisonReport) {
    println!("\n=== SCENARIO COMPARISON SUMMARY ===\n");
    println!("Scenarios: {}", report.metadata.scenario_count);
    if report.metadata.skipped_count > 0 {
        println!("Skipped: {}", report.metadata.skipped_count);
    }

    if let Some(name) = best_by(&report.scenarios, |m| m.throughput_mbps) {
        println!("  Highest throughput: {}", name);
    }
    if let Some(name) = best_by(&report.scenarios, |m| m.pdr) {
        println!("  Highest PDR: {}", name);
    }
    if let Some(name) = best_by(&report.scenarios, |m| -m.average_latency) {
        println!("  Lowest latency: {}", name);
    }
    println!();
}

/// Scenario with the largest key among those with a measurement
fn best_by(scenarios: &[ScenarioMetrics], key: impl Fn(&ScenarioMetrics) -> f64) -> Option<&str> {
    scenarios
        .iter()
        .filter(|m| m.has_measurement)
        .max_by(|a, b| key(a).total_cmp(&key(b)))
        .map(|m| m.scenario.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::normalize::normalize_scenarios;
    use crate::analysis::tabular::parse_topology_table;

    fn sample_report() -> ComparisonReport {
        let scenarios = vec![
            ScenarioMetrics {
                scenario: "Flying3D-0-0".to_string(),
                throughput_mbps: 0.25,
                pdr: 80.0,
                average_latency: 0.01,
                packet_loss: 20.0,
                packet_count: 100,
                total_bytes: 50_000,
                has_measurement: true,
            },
            ScenarioMetrics {
                scenario: "Flying3D-1-0".to_string(),
                throughput_mbps: 0.0,
                pdr: 80.0,
                average_latency: 0.0,
                packet_loss: 20.0,
                packet_count: 0,
                total_bytes: 0,
                has_measurement: false,
            },
        ];
        ComparisonReport {
            metadata: ReportMetadata {
                analysis_timestamp: "2026-01-01T00:00:00+00:00".to_string(),
                protocol_filter: Protocol::Ipv4,
                scenario_count: 2,
                skipped_count: 1,
            },
            normalized: normalize_scenarios(&scenarios).unwrap(),
            scenarios,
            skipped: vec![SkippedScenario {
                scenario: "broken".to_string(),
                reason: "Invalid capture file".to_string(),
            }],
        }
    }

    #[test]
    fn test_text_report_sections() {
        let text = render_text_report(&sample_report());
        assert!(text.contains("RAW METRICS"));
        assert!(text.contains("NORMALIZED METRICS"));
        assert!(text.contains("Flying3D-0-0"));
        assert!(text.contains("No matching packets"));
        assert!(text.contains("SKIPPED SCENARIOS"));
        assert!(text.contains("broken: Invalid capture file"));
    }

    #[test]
    fn test_json_report_round_trip() {
        let report = sample_report();
        let json = render_json_report(&report).unwrap();
        let parsed: ComparisonReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.scenarios, report.scenarios);
        assert_eq!(parsed.normalized, report.normalized);
    }

    #[test]
    fn test_topology_report_without_pdr() {
        let table = parse_topology_table("Star,1,2,3\nMesh,2,5,1\n".as_bytes()).unwrap();
        let text = render_topology_report(&table);
        assert!(text.contains("PDR(%) column not found"));
        assert!(text.contains("Star=0.000"));
        assert!(!text.contains("PDR (%)"));
        assert!(text.contains("Latency (ms)"));
        assert!(!text.contains("Latency (s)"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a_very_long_scenario_name", 8), "a_very_~");
    }
}
