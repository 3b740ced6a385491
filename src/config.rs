//! Analysis configuration.
//!
//! Describes where capture and trace artifacts come from and how they are
//! interpreted. Loaded from YAML by [`crate::config_loader`] and overridable
//! from the command line.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::analysis::types::{Protocol, TraceMarkers};

/// What to do with a scenario whose inputs fail to parse
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Leave the scenario out of the comparison and report it as skipped
    #[default]
    Skip,
    /// Fail the whole run
    Abort,
}

/// Where trace files for discovered scenarios are found
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum TraceSource {
    /// One trace file shared by every scenario
    Shared(PathBuf),
    /// A directory holding `<scenario>.tr` per scenario
    PerScenario(PathBuf),
}

/// An explicitly listed scenario
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ScenarioSource {
    pub name: String,
    pub capture: PathBuf,
    pub trace: PathBuf,
}

/// Inputs and interpretation settings for one comparison run
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Directory scanned for `*.pcap` files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture_source: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_source: Option<TraceSource>,
    #[serde(default = "default_protocol_filter")]
    pub protocol_filter: Protocol,
    #[serde(default)]
    pub trace_markers: TraceMarkers,
    #[serde(default)]
    pub error_policy: ErrorPolicy,
    /// Explicit scenarios; when non-empty, directory discovery is not used
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scenarios: Vec<ScenarioSource>,
}

fn default_protocol_filter() -> Protocol {
    Protocol::Ipv4
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            capture_source: None,
            trace_source: None,
            protocol_filter: default_protocol_filter(),
            trace_markers: TraceMarkers::default(),
            error_policy: ErrorPolicy::default(),
            scenarios: Vec::new(),
        }
    }
}

impl AnalysisConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        Self::validate_markers(&self.trace_markers)?;

        if self.scenarios.is_empty() {
            match (&self.capture_source, &self.trace_source) {
                (Some(_), Some(_)) => {}
                (None, _) => {
                    return Err(ValidationError::InvalidSources(
                        "either scenarios or capture_source must be provided".to_string(),
                    ));
                }
                (Some(_), None) => {
                    return Err(ValidationError::InvalidSources(
                        "trace_source is required when capture_source is used".to_string(),
                    ));
                }
            }
        }

        let mut seen = HashSet::new();
        for scenario in &self.scenarios {
            if scenario.name.trim().is_empty() {
                return Err(ValidationError::InvalidScenario(
                    "scenario name cannot be empty".to_string(),
                ));
            }
            if !seen.insert(scenario.name.as_str()) {
                return Err(ValidationError::InvalidScenario(format!(
                    "duplicate scenario name '{}'",
                    scenario.name
                )));
            }
        }

        Ok(())
    }

    fn validate_markers(markers: &TraceMarkers) -> Result<(), ValidationError> {
        if markers.sent.is_empty() || markers.received.is_empty() {
            return Err(ValidationError::InvalidMarkers(
                "trace markers cannot be empty".to_string(),
            ));
        }
        if markers.sent == markers.received {
            return Err(ValidationError::InvalidMarkers(format!(
                "sent and received markers must differ (both '{}')",
                markers.sent
            )));
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid input sources: {0}")]
    InvalidSources(String),
    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),
    #[error("Invalid trace markers: {0}")]
    InvalidMarkers(String),
}
