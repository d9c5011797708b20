//! Scenario loading and management.

use binning::{BinningConfig, BoundingBox};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A validation scenario loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub seed: Option<u64>, // Optional RNG seed for reproducible runs
    pub passes: u32,
    pub swath: SwathConfig,
    pub binning: BinningConfig,
}

/// Shape of the synthetic passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwathConfig {
    /// Area the swaths are drawn from.
    pub bbox: BoundingBox,
    /// Swath width in degrees of longitude.
    pub width_deg: f64,
    pub samples_per_pass: usize,
    pub start_mjd: f64,
    #[serde(default = "default_pass_interval")]
    pub pass_interval_days: f64,
    /// Probability of a sample having its mask variable cleared.
    #[serde(default)]
    pub cloud_fraction: f64,
    /// Probability of a sample value being NaN.
    #[serde(default)]
    pub nan_fraction: f64,
}

fn default_pass_interval() -> f64 {
    1.0
}

impl ScenarioConfig {
    /// Load a scenario from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ScenarioConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Validate the scenario and the binning config it carries.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.passes == 0 {
            anyhow::bail!("passes must be > 0");
        }
        if !self.swath.bbox.is_valid() {
            anyhow::bail!("swath bbox is invalid: {:?}", self.swath.bbox);
        }
        if self.swath.width_deg.is_nan() || self.swath.width_deg <= 0.0 {
            anyhow::bail!("swath width_deg must be > 0");
        }
        if self.swath.samples_per_pass == 0 {
            anyhow::bail!("samples_per_pass must be > 0");
        }
        for (name, p) in [
            ("cloud_fraction", self.swath.cloud_fraction),
            ("nan_fraction", self.swath.nan_fraction),
        ] {
            if !(0.0..=1.0).contains(&p) {
                anyhow::bail!("{name} must be in [0, 1], got {p}");
            }
        }
        self.binning
            .validate()
            .map_err(|e| anyhow::anyhow!("invalid binning config: {e}"))?;
        Ok(())
    }
}
