//! End-to-end scenario comparison.
//!
//! Analyzes every scenario's capture and trace independently (in parallel),
//! then funnels all results into a single normalization pass.

use color_eyre::eyre::{Context, Result};
use rayon::prelude::*;

use super::capture::analyze_capture;
use super::decode::read_capture_file;
use super::normalize::normalize_scenarios;
use super::synthesis::synthesize;
use super::trace_parser::parse_trace_file;
use super::types::*;
use crate::config::{AnalysisConfig, ErrorPolicy, ScenarioSource};

/// Analyze one scenario's capture and trace files
pub fn analyze_scenario(
    source: &ScenarioSource,
    filter: Protocol,
    markers: &TraceMarkers,
) -> Result<ScenarioMetrics, ParseError> {
    let packets = read_capture_file(&source.capture)?;
    let capture = analyze_capture(&packets, filter);
    let trace = parse_trace_file(&source.trace, markers)?;

    if capture.packet_count == 0 {
        log::warn!(
            "Scenario '{}': no {} packets in {} ({} packets total)",
            source.name,
            filter,
            source.capture.display(),
            packets.len()
        );
    }

    Ok(synthesize(&source.name, capture, trace))
}

/// Metrics for every scenario that could be analyzed, in input order
#[derive(Debug, Clone, Default)]
pub struct ScenarioOutcome {
    pub metrics: Vec<ScenarioMetrics>,
    pub skipped: Vec<SkippedScenario>,
}

/// Analyze all scenarios in parallel.
///
/// Results keep the order of `sources`. Failing scenarios are skipped or
/// abort the run according to the configured [`ErrorPolicy`].
pub fn analyze_scenarios(sources: &[ScenarioSource], config: &AnalysisConfig) -> Result<ScenarioOutcome> {
    log::info!("Analyzing {} scenarios in parallel...", sources.len());

    let results: Vec<(&ScenarioSource, Result<ScenarioMetrics, ParseError>)> = sources
        .par_iter()
        .map(|source| {
            let result = analyze_scenario(source, config.protocol_filter, &config.trace_markers);
            (source, result)
        })
        .collect();

    let mut outcome = ScenarioOutcome::default();
    for (source, result) in results {
        match result {
            Ok(metrics) => {
                log::debug!(
                    "Scenario '{}': {:.6} Mbps, PDR {:.2}%, latency {:.6}s",
                    metrics.scenario,
                    metrics.throughput_mbps,
                    metrics.pdr,
                    metrics.average_latency
                );
                outcome.metrics.push(metrics);
            }
            Err(e) => match config.error_policy {
                ErrorPolicy::Skip => {
                    log::warn!("Skipping scenario '{}': {}", source.name, e);
                    outcome.skipped.push(SkippedScenario {
                        scenario: source.name.clone(),
                        reason: e.to_string(),
                    });
                }
                ErrorPolicy::Abort => {
                    return Err(e).with_context(|| format!("Failed to analyze scenario '{}'", source.name));
                }
            },
        }
    }

    log::info!(
        "Analyzed {} scenarios, skipped {}",
        outcome.metrics.len(),
        outcome.skipped.len()
    );
    Ok(outcome)
}

/// Normalize analyzed scenarios and assemble the report for presentation
pub fn build_report(outcome: ScenarioOutcome, config: &AnalysisConfig) -> Result<ComparisonReport> {
    let normalized = normalize_scenarios(&outcome.metrics).context("Failed to normalize scenario metrics")?;

    Ok(ComparisonReport {
        metadata: ReportMetadata {
            analysis_timestamp: chrono::Utc::now().to_rfc3339(),
            protocol_filter: config.protocol_filter,
            scenario_count: outcome.metrics.len(),
            skipped_count: outcome.skipped.len(),
        },
        scenarios: outcome.metrics,
        normalized,
        skipped: outcome.skipped,
    })
}

/// Analyze the given scenarios and build the comparison report
pub fn run_comparison(sources: &[ScenarioSource], config: &AnalysisConfig) -> Result<ComparisonReport> {
    let outcome = analyze_scenarios(sources, config)?;
    build_report(outcome, config)
}
