//! Bins handed between the binning phases and to the sink.

use crate::unsigned::UnsignedInt;
use crate::vector::FeatureVector;
use serde::Serialize;

/// The completed spatial vector of one bin for one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialBin {
    pub index: i64,
    /// Observations the bin received in this pass.
    pub num_obs: usize,
    pub features: FeatureVector,
}

/// The merged temporal vector of one bin.
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalBin {
    pub index: i64,
    /// Observations summed over all passes.
    pub num_obs: UnsignedInt,
    /// Number of spatial bins merged.
    pub num_passes: UnsignedInt,
    pub features: FeatureVector,
}

/// One output record: a bin's reported features and where the bin is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinOutput {
    pub index: i64,
    pub row: usize,
    pub center_lat: f64,
    pub center_lon: f64,
    pub num_obs: u32,
    pub num_passes: u32,
    pub features: Vec<f32>,
}

/// Totals of a binning run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BinningSummary {
    pub num_passes: usize,
    /// Observations read from the source, before filtering.
    pub num_observations: u64,
    /// Observations that were binned.
    pub num_binned: u64,
    pub num_spatial_bins: usize,
    pub num_output_bins: usize,
    pub elapsed_ms: u64,
}
