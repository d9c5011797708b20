//! Temporal binning and output computation.

use crate::context::BinningContext;
use crate::error::Result;
use crate::types::{BinOutput, SpatialBin, TemporalBin};

/// Merges the spatial bins of a bin index into a temporal bin and derives
/// its output record. Holds no mutable state; one instance can serve any
/// number of bins concurrently.
#[derive(Clone, Copy)]
pub struct TemporalBinner<'a> {
    context: &'a BinningContext,
}

impl<'a> TemporalBinner<'a> {
    pub fn new(context: &'a BinningContext) -> Self {
        Self { context }
    }

    /// Merge `spatial_bins` (all of bin `index`, in pass order).
    pub fn process_spatial_bins(&self, index: i64, spatial_bins: &[SpatialBin]) -> Result<TemporalBin> {
        self.context
            .bin_manager()
            .merge_spatial_bins(index, spatial_bins)
    }

    /// Output record of a completed temporal bin.
    pub fn compute_output(&self, temporal_bin: &TemporalBin) -> Result<BinOutput> {
        let grid = self.context.planetary_grid();
        let row = grid.row_index(temporal_bin.index)?;
        let (center_lat, center_lon) = grid.center_lat_lon(temporal_bin.index)?;
        let features = self.context.bin_manager().output_vector(temporal_bin);
        Ok(BinOutput {
            index: temporal_bin.index,
            row,
            center_lat,
            center_lon,
            num_obs: temporal_bin.num_obs.get(),
            num_passes: temporal_bin.num_passes.get(),
            features: features.into_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::AggregatorConfig;
    use crate::bin_manager::BinManager;
    use crate::context::CompositingType;
    use crate::error::BinningError;
    use crate::grid::SeaGrid;
    use crate::observation::VariableContext;
    use crate::vector::FeatureVector;
    use std::sync::Arc;

    fn context() -> BinningContext {
        let vars = VariableContext::new(["ndvi", "mask", "pass"]).unwrap();
        let agg = AggregatorConfig::OnMaxSetWithMask {
            on_max_var_name: "ndvi".into(),
            mask_var_name: "mask".into(),
            target_name: None,
            set_var_names: vec!["pass".into()],
        }
        .create(&vars)
        .unwrap();
        BinningContext::builder()
            .planetary_grid(Arc::new(SeaGrid::new(18).unwrap()))
            .bin_manager(BinManager::new(vars, vec![agg]).unwrap())
            .compositing_type(CompositingType::Binning)
            .build()
            .unwrap()
    }

    #[test]
    fn test_merge_and_output() {
        let ctx = context();
        let binner = TemporalBinner::new(&ctx);
        let bins = vec![
            SpatialBin {
                index: 12,
                num_obs: 3,
                features: FeatureVector::from_vec(vec![0.6, 4.0, 3.0, 9.7]),
            },
            SpatialBin {
                index: 12,
                num_obs: 2,
                features: FeatureVector::from_vec(vec![0.3, 5.0, 2.0, 9.8]),
            },
        ];
        let temporal = binner.process_spatial_bins(12, &bins).unwrap();
        assert_eq!(temporal.num_obs.get(), 5);
        assert_eq!(temporal.num_passes.get(), 2);
        assert_eq!(temporal.features.as_slice(), &[0.6, 4.0, 5.0, 9.7]);

        let output = binner.compute_output(&temporal).unwrap();
        assert_eq!(output.features, vec![0.6, 4.0, 5.0, 9.7]);
        let grid = ctx.planetary_grid();
        assert_eq!(output.row, grid.row_index(12).unwrap());
        assert_eq!(
            (output.center_lat, output.center_lon),
            grid.center_lat_lon(12).unwrap()
        );
    }

    #[test]
    fn test_output_for_bin_outside_grid() {
        let ctx = context();
        let binner = TemporalBinner::new(&ctx);
        let temporal = binner.process_spatial_bins(1_000_000, &[]).unwrap();
        assert!(matches!(
            binner.compute_output(&temporal),
            Err(BinningError::BinOutOfRange { .. })
        ));
    }
}
