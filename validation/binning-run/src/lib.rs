//! Validation harness for the binning engine.
//!
//! This crate provides tools to:
//! - Generate synthetic satellite passes from a seeded scenario
//! - Run the full spatial and temporal binning pipeline over them
//! - Summarise the output bins in multiple formats (console, JSON, CSV)

pub mod config;
pub mod generator;
pub mod report;

pub use config::{ScenarioConfig, SwathConfig};
pub use generator::SwathGenerator;
pub use report::{FeatureStats, ResultsReport, RunResults};
