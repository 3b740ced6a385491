//! Cross-scenario min-max normalization.
//!
//! Each metric dimension is rescaled to [0, 1] independently, using the
//! minimum and maximum of that dimension over all scenarios in the batch.

use super::types::*;
use crate::utils::ratio::safe_ratio;

/// Errors raised when composing a comparison from mismatched inputs
#[derive(Debug, thiserror::Error)]
pub enum ComparisonError {
    #[error("{metric} has {actual} values for {expected} scenarios")]
    LengthMismatch {
        metric: MetricKind,
        expected: usize,
        actual: usize,
    },
}

/// Min-max normalize a batch of values, preserving order and length.
///
/// When all values are equal (including a single value) every output is 0.
/// Non-finite inputs do not take part in the min/max and map to 0, so every
/// output lies in [0, 1].
pub fn normalize_dimension(values: &[f64]) -> Vec<f64> {
    let finite = || values.iter().copied().filter(|v| v.is_finite());
    let min_val = finite().fold(f64::INFINITY, f64::min);
    let max_val = finite().fold(f64::NEG_INFINITY, f64::max);
    let range = max_val - min_val;

    values
        .iter()
        .map(|&v| if v.is_finite() { safe_ratio(v - min_val, range, 0.0) } else { 0.0 })
        .collect()
}

fn dimension(metric: MetricKind, names: &[String], values: Vec<f64>) -> Result<NormalizedDimension, ComparisonError> {
    if values.len() != names.len() {
        return Err(ComparisonError::LengthMismatch {
            metric,
            expected: names.len(),
            actual: values.len(),
        });
    }
    let values = names
        .iter()
        .zip(values)
        .map(|(scenario, value)| NormalizedValue {
            scenario: scenario.clone(),
            value,
        })
        .collect();
    Ok(NormalizedDimension { metric, values })
}

/// Pair already-normalized dimensions with their scenario names
pub fn compose(
    scenario_names: &[String],
    throughput: Vec<f64>,
    pdr: Vec<f64>,
    latency: Vec<f64>,
) -> Result<NormalizedComparison, ComparisonError> {
    Ok(NormalizedComparison {
        throughput: dimension(MetricKind::Throughput, scenario_names, throughput)?,
        pdr: dimension(MetricKind::Pdr, scenario_names, pdr)?,
        latency: dimension(MetricKind::Latency, scenario_names, latency)?,
    })
}

/// Normalize throughput, PDR and latency across a complete set of scenarios
pub fn normalize_scenarios(scenarios: &[ScenarioMetrics]) -> Result<NormalizedComparison, ComparisonError> {
    let names: Vec<String> = scenarios.iter().map(|s| s.scenario.clone()).collect();
    let column = |value: fn(&ScenarioMetrics) -> f64| {
        normalize_dimension(&scenarios.iter().map(value).collect::<Vec<_>>())
    };

    let throughput = column(|s| s.throughput_mbps);
    let pdr = column(|s| s.pdr);
    let latency = column(|s| s.average_latency);

    compose(&names, throughput, pdr, latency)
}
