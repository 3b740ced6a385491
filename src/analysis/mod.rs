//! Metrics extraction and cross-scenario comparison for network simulations.
//!
//! This module turns packet captures and event-log traces into per-scenario
//! metrics, normalizes them across scenarios, and renders the result.

pub mod types;
pub mod trace_parser;
pub mod capture;
pub mod decode;
pub mod synthesis;
pub mod normalize;
pub mod pipeline;
pub mod tabular;
pub mod report;

pub use types::*;
pub use trace_parser::{classify_line, parse_trace, parse_trace_file};
pub use capture::analyze_capture;
pub use decode::read_capture_file;
pub use synthesis::synthesize;
pub use normalize::{compose, normalize_dimension, normalize_scenarios};
pub use pipeline::{analyze_scenarios, run_comparison};
pub use report::{render_json_report, render_text_report};
