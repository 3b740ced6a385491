//! Scenario comparison CLI for network simulation traces.
//!
//! Derives throughput, packet delivery ratio, latency and packet loss from
//! captures and traces, and compares them across scenarios.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};
use env_logger::Env;
use log::{info, warn};

use netsim_metrics::analysis::{self, tabular, types::Protocol};
use netsim_metrics::config::{AnalysisConfig, ErrorPolicy};
use netsim_metrics::config_loader::{self, CliOverrides};
use netsim_metrics::discovery::{self, Discovery};

#[derive(Parser, Debug)]
#[command(name = "netsim-metrics")]
#[command(about = "Metrics extraction and comparison for network simulation traces")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Report format written to stdout
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    format: OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Number of parallel workers (0 = auto-detect)
    #[arg(short = 'j', long, default_value = "0", global = true)]
    threads: usize,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare scenarios from capture and trace files
    Scenarios {
        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory containing one .pcap file per scenario
        #[arg(long)]
        captures: Option<PathBuf>,

        /// Trace file shared by all scenarios
        #[arg(long, conflicts_with = "trace_dir")]
        trace: Option<PathBuf>,

        /// Directory containing <scenario>.tr trace files
        #[arg(long)]
        trace_dir: Option<PathBuf>,

        /// Protocol layer a packet must carry to be counted
        #[arg(short, long, value_enum)]
        protocol: Option<Protocol>,

        /// Substring marking a send event in the trace
        #[arg(long)]
        sent_marker: Option<String>,

        /// Substring marking a receive event in the trace
        #[arg(long)]
        received_marker: Option<String>,

        /// What to do when a scenario's inputs cannot be parsed
        #[arg(long, value_enum)]
        on_error: Option<ErrorPolicy>,
    },

    /// Compare topologies from a metrics table
    Topologies {
        /// CSV file: Topology,PacketLoss(%),Latency(ms),Throughput(Mbps)[,PDR(%)]
        #[arg(default_value = "network_metrics.csv")]
        metrics: PathBuf,
    },

    /// Compare traffic flow types from a metrics table
    Flows {
        /// CSV file with a "Flow Type" header row
        #[arg(default_value = "enhanced_traffic_metrics.csv")]
        metrics: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or(&cli.log_level)).init();

    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Scenarios {
            config,
            captures,
            trace,
            trace_dir,
            protocol,
            sent_marker,
            received_marker,
            on_error,
        } => {
            let mut analysis_config = match &config {
                Some(path) => config_loader::load_config(path)?,
                None => AnalysisConfig::default(),
            };
            let overrides = CliOverrides {
                capture_dir: captures,
                trace_file: trace,
                trace_dir,
                protocol,
                sent_marker,
                received_marker,
                error_policy: on_error,
            };
            config_loader::apply_overrides(&mut analysis_config, &overrides)?;
            run_scenarios(&analysis_config, cli.format)?;
        }
        Commands::Topologies { metrics } => {
            let table = tabular::load_topology_table(&metrics)
                .with_context(|| format!("Failed to load topology metrics from {}", metrics.display()))?;
            if !table.has_pdr() {
                warn!("Column 'PDR(%)' not found in {}", metrics.display());
            }
            match cli.format {
                OutputFormat::Text => println!("{}", analysis::report::render_topology_report(&table)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&table.records)?),
            }
        }
        Commands::Flows { metrics } => {
            let samples = tabular::load_flow_samples(&metrics)
                .with_context(|| format!("Failed to load flow metrics from {}", metrics.display()))?;
            let series = tabular::group_flow_series(&samples);
            match cli.format {
                OutputFormat::Text => println!("{}", analysis::report::render_flow_report(&series)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&series)?),
            }
        }
    }

    Ok(())
}

fn run_scenarios(config: &AnalysisConfig, format: OutputFormat) -> Result<()> {
    info!("Protocol filter: {}", config.protocol_filter);

    let scenarios = match discovery::resolve_scenarios(config)? {
        Discovery::Found(scenarios) => scenarios,
        Discovery::NoArtifacts(reason) => {
            warn!("{}", reason);
            println!("No input artifacts found: {}", reason);
            return Ok(());
        }
    };

    let report = analysis::run_comparison(&scenarios, config)?;

    match format {
        OutputFormat::Text => {
            println!("{}", analysis::render_text_report(&report));
            analysis::report::print_summary(&report);
        }
        OutputFormat::Json => println!("{}", analysis::render_json_report(&report)?),
    }

    info!("Analysis complete: {} scenarios compared", report.metadata.scenario_count);
    Ok(())
}
