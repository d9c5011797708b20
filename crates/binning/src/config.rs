//! Configuration for a binning run.

use crate::aggregator::AggregatorConfig;
use crate::bin_manager::BinManager;
use crate::context::{BinningContext, CompositingType};
use crate::error::{BinningError, Result};
use crate::grid::{ComputedGaussianTables, GridKind};
use crate::observation::VariableContext;
use crate::period::DataPeriod;
use crate::region::Region;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Configuration of a binning run, usually read from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinningConfig {
    /// Planetary grid type.
    pub planetary_grid: GridKind,

    /// Number of latitude rows of the grid.
    pub num_rows: usize,

    pub compositing_type: CompositingType,

    /// Sub-pixel sampling factor handed to observation producers.
    pub super_sampling: Option<u32>,

    /// Names of the observation variables, in value order.
    pub variables: Vec<String>,

    pub aggregators: Vec<AggregatorConfig>,

    pub data_period: Option<DataPeriod>,

    pub region: Option<Region>,
}

impl Default for BinningConfig {
    fn default() -> Self {
        Self {
            planetary_grid: GridKind::Sea,
            num_rows: 2160,
            compositing_type: CompositingType::Binning,
            super_sampling: None,
            variables: Vec::new(),
            aggregators: Vec::new(),
            data_period: None,
            region: None,
        }
    }
}

impl BinningConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read a YAML config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading binning config");
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Override fields from `BINNING_*` environment variables.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("BINNING_NUM_ROWS") {
            match val.parse() {
                Ok(rows) => self.num_rows = rows,
                Err(_) => warn!(value = %val, "Ignoring invalid BINNING_NUM_ROWS"),
            }
        }

        if let Some(val) = lookup("BINNING_SUPER_SAMPLING") {
            match val.parse() {
                Ok(factor) => self.super_sampling = Some(factor),
                Err(_) => warn!(value = %val, "Ignoring invalid BINNING_SUPER_SAMPLING"),
            }
        }

        if let Some(val) = lookup("BINNING_GRID") {
            match GridKind::parse(&val) {
                Some(kind) => self.planetary_grid = kind,
                None => warn!(value = %val, "Ignoring unknown BINNING_GRID"),
            }
        }

        if let Some(val) = lookup("BINNING_COMPOSITING") {
            match CompositingType::parse(&val) {
                Some(compositing) => self.compositing_type = compositing,
                None => warn!(value = %val, "Ignoring unknown BINNING_COMPOSITING"),
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.num_rows <= 2 {
            return Err(format!("num_rows must be > 2, got {}", self.num_rows));
        }

        if self.planetary_grid != GridKind::Sea && self.num_rows % 2 != 0 {
            return Err(format!(
                "num_rows must be even for {} grids, got {}",
                self.planetary_grid, self.num_rows
            ));
        }

        if self.super_sampling == Some(0) {
            return Err("super_sampling must be >= 1".to_string());
        }

        if self.variables.is_empty() {
            return Err("at least one variable must be configured".to_string());
        }

        if self.aggregators.is_empty() {
            return Err("at least one aggregator must be configured".to_string());
        }

        if let Some(period) = &self.data_period {
            period.validate()?;
        }

        if let Some(region) = &self.region {
            region.validate()?;
        }

        Ok(())
    }

    /// Build the immutable context of a run from this configuration.
    pub fn create_binning_context(&self) -> Result<BinningContext> {
        self.validate().map_err(BinningError::Config)?;

        let variables = VariableContext::new(self.variables.iter().cloned())?;
        let aggregators = self
            .aggregators
            .iter()
            .map(|config| config.create(&variables))
            .collect::<Result<Vec<_>>>()?;
        let bin_manager = BinManager::new(variables, aggregators)?;
        let grid = self
            .planetary_grid
            .create(self.num_rows, &ComputedGaussianTables)?;

        debug!(
            grid = %self.planetary_grid,
            num_rows = self.num_rows,
            num_bins = grid.num_bins(),
            "Created planetary grid"
        );

        BinningContext::builder()
            .planetary_grid(grid)
            .bin_manager(bin_manager)
            .compositing_type(self.compositing_type)
            .super_sampling(self.super_sampling)
            .data_period(self.data_period)
            .region(self.region.clone())
            .build()
    }
}
