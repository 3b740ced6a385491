//! # Netsim Metrics - Metrics extraction for network simulation traces
//!
//! This library derives comparable performance metrics from the artifacts a
//! network simulation leaves behind (for example an ns-3 run): packet
//! captures and line-oriented event traces.
//!
//! ## Overview
//!
//! For each scenario, the capture and the trace are analyzed independently
//! and combined into one metrics record. All records are then min-max
//! normalized per metric so scenarios can be compared side by side.
//!
//! ## Key Features
//!
//! - **Capture Analysis**: Classic pcap files over Ethernet, raw IP, PPP,
//!   Linux SLL, loopback and 802.11/radiotap links, filtered to one protocol
//! - **Trace Analysis**: Send/receive tallies and packet delivery ratio from
//!   ASCII event traces
//! - **Degenerate Inputs**: Empty captures, empty traces and identical values
//!   produce defined results instead of division errors
//! - **Normalization**: Independent per-dimension min-max scaling
//! - **Tabular Data**: Topology and traffic-flow comparison CSV files
//!
//! ## Architecture
//!
//! - `analysis`: Parsers, analyzers, normalization and report rendering
//! - `config`: Analysis configuration structures and validation
//! - `config_loader`: YAML loading and command-line overrides
//! - `discovery`: Scenario discovery from capture directories
//! - `utils`: Guarded division shared by every derived metric
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use netsim_metrics::{analysis, config::AnalysisConfig, discovery};
//!
//! let config: AnalysisConfig = serde_yaml::from_str(r#"
//! capture_source: "pcap_files"
//! trace_source:
//!   shared: "trace_files/Flying3D.tr"
//! "#)?;
//!
//! if let discovery::Discovery::Found(scenarios) = discovery::resolve_scenarios(&config)? {
//!     let report = analysis::run_comparison(&scenarios, &config)?;
//!     println!("{}", analysis::render_text_report(&report));
//! }
//! # Ok::<(), color_eyre::eyre::Report>(())
//! ```
//!
//! ## Error Handling
//!
//! Structural input problems are reported as [`analysis::ParseError`];
//! application-level functions return `color_eyre::Result` with context.

pub mod analysis;
pub mod config;
pub mod config_loader;
pub mod discovery;
pub mod utils;
