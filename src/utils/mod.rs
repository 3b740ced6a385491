//! Shared utilities.

pub mod ratio;

pub use ratio::{safe_percentage, safe_ratio};
