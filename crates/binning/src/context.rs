//! The immutable configuration bundle of a binning run.

use crate::bin_manager::BinManager;
use crate::error::{BinningError, Result};
use crate::grid::PlanetaryGrid;
use crate::period::DataPeriod;
use crate::region::Region;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How observations of one pass contribute to a bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CompositingType {
    /// Every observation falling into a bin is aggregated.
    #[default]
    Binning,
    /// Only the first observation falling into a bin in a pass is aggregated.
    Mosaicking,
}

impl CompositingType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "binning" => Some(Self::Binning),
            "mosaicking" => Some(Self::Mosaicking),
            _ => None,
        }
    }
}

/// Grid, bin manager and run policy.
///
/// Built once per run through [`BinningContextBuilder`] and shared read-only
/// by every worker.
#[derive(Debug, Clone)]
pub struct BinningContext {
    planetary_grid: Arc<dyn PlanetaryGrid>,
    bin_manager: Arc<BinManager>,
    compositing_type: CompositingType,
    super_sampling: Option<u32>,
    data_period: Option<DataPeriod>,
    region: Option<Region>,
}

impl BinningContext {
    pub fn builder() -> BinningContextBuilder {
        BinningContextBuilder::default()
    }

    pub fn planetary_grid(&self) -> &dyn PlanetaryGrid {
        self.planetary_grid.as_ref()
    }

    pub fn bin_manager(&self) -> &BinManager {
        &self.bin_manager
    }

    pub fn compositing_type(&self) -> CompositingType {
        self.compositing_type
    }

    /// Sub-pixel sampling factor for the observation producer.
    pub fn super_sampling(&self) -> Option<u32> {
        self.super_sampling
    }

    pub fn data_period(&self) -> Option<&DataPeriod> {
        self.data_period.as_ref()
    }

    pub fn region(&self) -> Option<&Region> {
        self.region.as_ref()
    }
}

/// Builder for [`BinningContext`]. Grid, bin manager and compositing type are
/// required.
#[derive(Debug, Default)]
pub struct BinningContextBuilder {
    planetary_grid: Option<Arc<dyn PlanetaryGrid>>,
    bin_manager: Option<Arc<BinManager>>,
    compositing_type: Option<CompositingType>,
    super_sampling: Option<u32>,
    data_period: Option<DataPeriod>,
    region: Option<Region>,
}

impl BinningContextBuilder {
    pub fn planetary_grid(mut self, grid: Arc<dyn PlanetaryGrid>) -> Self {
        self.planetary_grid = Some(grid);
        self
    }

    pub fn bin_manager(mut self, bin_manager: BinManager) -> Self {
        self.bin_manager = Some(Arc::new(bin_manager));
        self
    }

    pub fn compositing_type(mut self, compositing_type: CompositingType) -> Self {
        self.compositing_type = Some(compositing_type);
        self
    }

    pub fn super_sampling(mut self, super_sampling: Option<u32>) -> Self {
        self.super_sampling = super_sampling;
        self
    }

    pub fn data_period(mut self, data_period: Option<DataPeriod>) -> Self {
        self.data_period = data_period;
        self
    }

    pub fn region(mut self, region: Option<Region>) -> Self {
        self.region = region;
        self
    }

    pub fn build(self) -> Result<BinningContext> {
        let planetary_grid = self
            .planetary_grid
            .ok_or_else(|| BinningError::config("planetary grid must be given"))?;
        let bin_manager = self
            .bin_manager
            .ok_or_else(|| BinningError::config("bin manager must be given"))?;
        let compositing_type = self
            .compositing_type
            .ok_or_else(|| BinningError::config("compositing type must be given"))?;
        if self.super_sampling == Some(0) {
            return Err(BinningError::config("super sampling must be >= 1"));
        }

        Ok(BinningContext {
            planetary_grid,
            bin_manager,
            compositing_type,
            super_sampling: self.super_sampling,
            data_period: self.data_period,
            region: self.region,
        })
    }
}
