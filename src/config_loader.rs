use crate::analysis::types::{Protocol, TraceMarkers};
use crate::config::{AnalysisConfig, ErrorPolicy, TraceSource};
use color_eyre::eyre::Context;
use color_eyre::Result;
use log::info;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Load and parse configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<AnalysisConfig> {
    info!("Loading configuration from: {:?}", config_path);

    let file = File::open(config_path)
        .with_context(|| format!("Failed to open configuration file '{}'", config_path.display()))?;

    let config: AnalysisConfig = serde_yaml::from_reader(file)
        .with_context(|| format!("Failed to parse configuration file '{}'", config_path.display()))?;

    if !config.scenarios.is_empty() {
        info!("Configuration lists {} explicit scenarios", config.scenarios.len());
    }

    Ok(config)
}

/// Command-line values that override the YAML settings
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub capture_dir: Option<PathBuf>,
    pub trace_file: Option<PathBuf>,
    pub trace_dir: Option<PathBuf>,
    pub protocol: Option<Protocol>,
    pub sent_marker: Option<String>,
    pub received_marker: Option<String>,
    pub error_policy: Option<ErrorPolicy>,
}

/// Apply CLI overrides to a configuration and validate the result
pub fn apply_overrides(config: &mut AnalysisConfig, overrides: &CliOverrides) -> Result<()> {
    if let Some(dir) = &overrides.capture_dir {
        info!("Capture directory overridden: {:?}", dir);
        config.capture_source = Some(dir.clone());
        // Discovery replaces any explicit scenario list
        config.scenarios.clear();
    }

    if let Some(file) = &overrides.trace_file {
        config.trace_source = Some(TraceSource::Shared(file.clone()));
    } else if let Some(dir) = &overrides.trace_dir {
        config.trace_source = Some(TraceSource::PerScenario(dir.clone()));
    }

    if let Some(protocol) = overrides.protocol {
        config.protocol_filter = protocol;
    }

    let TraceMarkers { sent, received } = &mut config.trace_markers;
    if let Some(marker) = &overrides.sent_marker {
        *sent = marker.clone();
    }
    if let Some(marker) = &overrides.received_marker {
        *received = marker.clone();
    }

    if let Some(policy) = overrides.error_policy {
        config.error_policy = policy;
    }

    config.validate()?;
    Ok(())
}
