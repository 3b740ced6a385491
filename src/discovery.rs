//! Scenario discovery.
//!
//! Turns an [`AnalysisConfig`] into the ordered list of scenarios to
//! analyze: either the explicit list from the configuration, or one scenario
//! per `*.pcap` file in the capture directory, sorted by name.

use std::fs;
use std::path::Path;

use color_eyre::eyre::{Context, Result};

use crate::config::{AnalysisConfig, ScenarioSource, TraceSource};

/// Extension of capture files picked up by discovery
pub const CAPTURE_EXTENSION: &str = "pcap";
/// Extension of per-scenario trace files
pub const TRACE_EXTENSION: &str = "tr";

/// Result of looking for input artifacts
#[derive(Debug, Clone, PartialEq)]
pub enum Discovery {
    Found(Vec<ScenarioSource>),
    /// Nothing to analyze; carries a user-facing explanation
    NoArtifacts(String),
}

/// Resolve the scenarios a configuration refers to
pub fn resolve_scenarios(config: &AnalysisConfig) -> Result<Discovery> {
    if !config.scenarios.is_empty() {
        return Ok(Discovery::Found(config.scenarios.clone()));
    }

    match (&config.capture_source, &config.trace_source) {
        (Some(capture_dir), Some(trace_source)) => discover_scenarios(capture_dir, trace_source),
        _ => Ok(Discovery::NoArtifacts(
            "No capture source configured".to_string(),
        )),
    }
}

/// List `*.pcap` files in `capture_dir` and pair each with its trace file.
///
/// The scenario name is the file stem. A missing directory or one without
/// capture files is not an error.
pub fn discover_scenarios(capture_dir: &Path, trace_source: &TraceSource) -> Result<Discovery> {
    if !capture_dir.is_dir() {
        return Ok(Discovery::NoArtifacts(format!(
            "Capture directory '{}' does not exist",
            capture_dir.display()
        )));
    }

    let entries = fs::read_dir(capture_dir)
        .with_context(|| format!("Failed to list capture directory '{}'", capture_dir.display()))?;

    let mut scenarios = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to read entry in '{}'", capture_dir.display()))?
            .path();

        if !path.is_file() || path.extension().map_or(true, |ext| ext != CAPTURE_EXTENSION) {
            continue;
        }
        let Some(name) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };

        let trace = match trace_source {
            TraceSource::Shared(file) => file.clone(),
            TraceSource::PerScenario(dir) => dir.join(format!("{}.{}", name, TRACE_EXTENSION)),
        };
        if !trace.exists() {
            log::warn!("Trace file {} for scenario '{}' does not exist", trace.display(), name);
        }

        scenarios.push(ScenarioSource {
            name,
            capture: path,
            trace,
        });
    }

    if scenarios.is_empty() {
        return Ok(Discovery::NoArtifacts(format!(
            "No .{} files found in '{}'",
            CAPTURE_EXTENSION,
            capture_dir.display()
        )));
    }

    scenarios.sort_by(|a, b| a.name.cmp(&b.name));
    log::info!("Discovered {} scenarios in {}", scenarios.len(), capture_dir.display());
    Ok(Discovery::Found(scenarios))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_discovery_sorted_by_name() {
        let dir = TempDir::new().unwrap();
        for name in ["mesh.pcap", "ring.pcap", "bus.pcap", "notes.txt"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }

        let trace = TraceSource::Shared(PathBuf::from("shared.tr"));
        let Discovery::Found(scenarios) = discover_scenarios(dir.path(), &trace).unwrap() else {
            panic!("expected scenarios");
        };

        let names: Vec<&str> = scenarios.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["bus", "mesh", "ring"]);
        assert!(scenarios.iter().all(|s| s.trace == PathBuf::from("shared.tr")));
    }

    #[test]
    fn test_per_scenario_traces() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Flying3D-0-0.pcap"), b"").unwrap();

        let trace = TraceSource::PerScenario(PathBuf::from("traces"));
        let Discovery::Found(scenarios) = discover_scenarios(dir.path(), &trace).unwrap() else {
            panic!("expected scenarios");
        };
        assert_eq!(scenarios[0].name, "Flying3D-0-0");
        assert_eq!(scenarios[0].trace, PathBuf::from("traces/Flying3D-0-0.tr"));
    }

    #[test]
    fn test_missing_directory_is_not_an_error() {
        let trace = TraceSource::Shared(PathBuf::from("shared.tr"));
        let result = discover_scenarios(Path::new("/nonexistent/pcap_files"), &trace).unwrap();
        assert!(matches!(result, Discovery::NoArtifacts(_)));
    }

    #[test]
    fn test_empty_directory_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let trace = TraceSource::Shared(PathBuf::from("shared.tr"));
        let result = discover_scenarios(dir.path(), &trace).unwrap();
        assert!(matches!(result, Discovery::NoArtifacts(_)));
    }

    #[test]
    fn test_explicit_scenarios_take_precedence() {
        let config = AnalysisConfig {
            capture_source: Some(PathBuf::from("/nonexistent")),
            scenarios: vec![ScenarioSource {
                name: "only".to_string(),
                capture: PathBuf::from("only.pcap"),
                trace: PathBuf::from("only.tr"),
            }],
            ..Default::default()
        };
        let result = resolve_scenarios(&config).unwrap();
        assert!(matches!(result, Discovery::Found(ref s) if s.len() == 1));
    }
}
