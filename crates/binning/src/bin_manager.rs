//! Composition of aggregators into composite per-bin vectors.

use crate::aggregator::Aggregator;
use crate::bin_context::BinContext;
use crate::error::{BinningError, Result};
use crate::observation::{Observation, VariableContext};
use crate::types::{SpatialBin, TemporalBin};
use crate::unsigned::UnsignedInt;
use crate::vector::{FeatureVector, Vector, VectorMut};
use tracing::debug;

/// Where each aggregator's slots sit inside one phase's composite vector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureLayout {
    offsets: Vec<usize>,
    lengths: Vec<usize>,
    names: Vec<String>,
}

impl FeatureLayout {
    fn build<'a>(per_aggregator: impl Iterator<Item = &'a [String]>) -> Self {
        let mut layout = Self::default();
        for names in per_aggregator {
            layout.offsets.push(layout.names.len());
            layout.lengths.push(names.len());
            layout.names.extend(names.iter().cloned());
        }
        layout
    }

    /// Total number of slots.
    pub fn size(&self) -> usize {
        self.names.len()
    }

    /// `(offset, length)` of aggregator `i`.
    pub fn range(&self, i: usize) -> (usize, usize) {
        (self.offsets[i], self.lengths[i])
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Owns the aggregators of a run and dispatches every phase to each of them,
/// in list order, over its own slice of the composite vector.
#[derive(Debug)]
pub struct BinManager {
    variable_context: VariableContext,
    aggregators: Vec<Box<dyn Aggregator>>,
    spatial: FeatureLayout,
    temporal: FeatureLayout,
    output: FeatureLayout,
}

impl BinManager {
    pub fn new(
        variable_context: VariableContext,
        aggregators: Vec<Box<dyn Aggregator>>,
    ) -> Result<Self> {
        if aggregators.is_empty() {
            return Err(BinningError::config("at least one aggregator is required"));
        }
        let spatial = FeatureLayout::build(aggregators.iter().map(|a| a.spatial_feature_names()));
        let temporal =
            FeatureLayout::build(aggregators.iter().map(|a| a.temporal_feature_names()));
        let output = FeatureLayout::build(aggregators.iter().map(|a| a.output_feature_names()));

        let mut seen = std::collections::HashSet::new();
        if let Some(dup) = output.names().iter().find(|name| !seen.insert(name.as_str())) {
            return Err(BinningError::config(format!(
                "output feature '{dup}' produced by more than one aggregator"
            )));
        }

        debug!(
            aggregators = aggregators.len(),
            spatial_features = spatial.size(),
            temporal_features = temporal.size(),
            output_features = output.size(),
            "Created bin manager"
        );

        Ok(Self {
            variable_context,
            aggregators,
            spatial,
            temporal,
            output,
        })
    }

    pub fn variable_context(&self) -> &VariableContext {
        &self.variable_context
    }

    pub fn aggregator_count(&self) -> usize {
        self.aggregators.len()
    }

    pub fn aggregator(&self, i: usize) -> &dyn Aggregator {
        self.aggregators[i].as_ref()
    }

    pub fn spatial_layout(&self) -> &FeatureLayout {
        &self.spatial
    }

    pub fn temporal_layout(&self) -> &FeatureLayout {
        &self.temporal
    }

    pub fn output_layout(&self) -> &FeatureLayout {
        &self.output
    }

    pub fn spatial_feature_names(&self) -> &[String] {
        self.spatial.names()
    }

    pub fn temporal_feature_names(&self) -> &[String] {
        self.temporal.names()
    }

    pub fn output_feature_names(&self) -> &[String] {
        self.output.names()
    }

    // ---------------------------------------------------------------------
    // Vector-level dispatch
    // ---------------------------------------------------------------------

    pub fn init_spatial(&self, ctx: &mut BinContext, spatial: &mut VectorMut<'_>) {
        for (i, agg) in self.aggregators.iter().enumerate() {
            let (offset, len) = self.spatial.range(i);
            agg.init_spatial(ctx, &mut spatial.range_mut(offset, len));
        }
    }

    pub fn aggregate_spatial(
        &self,
        ctx: &mut BinContext,
        observation: &Observation,
        spatial: &mut VectorMut<'_>,
    ) {
        for (i, agg) in self.aggregators.iter().enumerate() {
            let (offset, len) = self.spatial.range(i);
            agg.aggregate_spatial(ctx, observation, &mut spatial.range_mut(offset, len));
        }
    }

    pub fn complete_spatial(
        &self,
        ctx: &mut BinContext,
        num_spatial_obs: usize,
        spatial: &mut VectorMut<'_>,
    ) {
        for (i, agg) in self.aggregators.iter().enumerate() {
            let (offset, len) = self.spatial.range(i);
            agg.complete_spatial(ctx, num_spatial_obs, &mut spatial.range_mut(offset, len));
        }
    }

    pub fn init_temporal(&self, ctx: &mut BinContext, temporal: &mut VectorMut<'_>) {
        for (i, agg) in self.aggregators.iter().enumerate() {
            let (offset, len) = self.temporal.range(i);
            agg.init_temporal(ctx, &mut temporal.range_mut(offset, len));
        }
    }

    pub fn aggregate_temporal(
        &self,
        ctx: &mut BinContext,
        spatial: &Vector<'_>,
        num_spatial_obs: usize,
        temporal: &mut VectorMut<'_>,
    ) {
        for (i, agg) in self.aggregators.iter().enumerate() {
            let (s_offset, s_len) = self.spatial.range(i);
            let (t_offset, t_len) = self.temporal.range(i);
            agg.aggregate_temporal(
                ctx,
                &spatial.range(s_offset, s_len),
                num_spatial_obs,
                &mut temporal.range_mut(t_offset, t_len),
            );
        }
    }

    pub fn complete_temporal(
        &self,
        ctx: &mut BinContext,
        num_temporal_obs: usize,
        temporal: &mut VectorMut<'_>,
    ) {
        for (i, agg) in self.aggregators.iter().enumerate() {
            let (offset, len) = self.temporal.range(i);
            agg.complete_temporal(ctx, num_temporal_obs, &mut temporal.range_mut(offset, len));
        }
    }

    pub fn compute_output(&self, temporal: &Vector<'_>, output: &mut VectorMut<'_>) {
        for (i, agg) in self.aggregators.iter().enumerate() {
            let (t_offset, t_len) = self.temporal.range(i);
            let (o_offset, o_len) = self.output.range(i);
            agg.compute_output(
                &temporal.range(t_offset, t_len),
                &mut output.range_mut(o_offset, o_len),
            );
        }
    }

    // ---------------------------------------------------------------------
    // Bin-level helpers
    // ---------------------------------------------------------------------

    /// Merge the spatial bins of one bin index, in the given order, into a
    /// completed temporal bin.
    pub fn merge_spatial_bins(&self, index: i64, spatial_bins: &[SpatialBin]) -> Result<TemporalBin> {
        let mut ctx = BinContext::new(index);
        let mut features = FeatureVector::new(self.temporal.size());
        self.init_temporal(&mut ctx, &mut features.view_mut());

        let mut num_obs = 0i64;
        for bin in spatial_bins {
            self.aggregate_temporal(&mut ctx, &bin.features.view(), bin.num_obs, &mut features.view_mut());
            num_obs += bin.num_obs as i64;
        }
        self.complete_temporal(&mut ctx, spatial_bins.len(), &mut features.view_mut());

        Ok(TemporalBin {
            index,
            num_obs: UnsignedInt::new(num_obs)?,
            num_passes: UnsignedInt::new(spatial_bins.len() as i64)?,
            features,
        })
    }

    /// Output vector of a completed temporal bin.
    pub fn output_vector(&self, temporal_bin: &TemporalBin) -> FeatureVector {
        let mut output = FeatureVector::new(self.output.size());
        self.compute_output(&temporal_bin.features.view(), &mut output.view_mut());
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::AggregatorConfig;

    fn manager() -> BinManager {
        let ctx = VariableContext::new(["chl", "ndvi", "mask"]).unwrap();
        let aggregators = vec![
            AggregatorConfig::Average {
                var_name: "chl".into(),
                target_name: None,
                weight_coeff: None,
                output_counts: false,
            },
            AggregatorConfig::OnMaxSetWithMask {
                on_max_var_name: "ndvi".into(),
                mask_var_name: "mask".into(),
                target_name: None,
                set_var_names: vec!["chl".into()],
            },
        ]
        .iter()
        .map(|c| c.create(&ctx))
        .collect::<Result<Vec<_>>>()
        .unwrap();
        BinManager::new(ctx, aggregators).unwrap()
    }

    #[test]
    fn test_composite_layout() {
        let bm = manager();
        assert_eq!(
            bm.spatial_feature_names(),
            &["chl_sum_x", "chl_sum_xx", "ndvi_max", "ndvi_mjd", "ndvi_count", "chl"]
        );
        assert_eq!(bm.temporal_layout().size(), 7);
        assert_eq!(bm.temporal_layout().range(1), (3, 4));
        assert_eq!(
            bm.output_feature_names(),
            &["chl_mean", "chl_sigma", "ndvi_max", "ndvi_mjd", "ndvi_count", "chl"]
        );
    }

    #[test]
    fn test_dispatch_keeps_aggregators_apart() {
        let bm = manager();
        let mut ctx = BinContext::new(5);
        let mut s = FeatureVector::new(bm.spatial_layout().size());
        bm.init_spatial(&mut ctx, &mut s.view_mut());
        let obs = Observation::new(0.0, 0.0, 100.0, vec![2.0, 0.4, 1.0]);
        bm.aggregate_spatial(&mut ctx, &obs, &mut s.view_mut());
        bm.complete_spatial(&mut ctx, 1, &mut s.view_mut());
        assert_eq!(s.as_slice(), &[2.0, 4.0, 0.4, 100.0, 1.0, 2.0]);

        let spatial = SpatialBin {
            index: 5,
            num_obs: 1,
            features: s,
        };
        let temporal = bm.merge_spatial_bins(5, &[spatial.clone(), spatial]).unwrap();
        assert_eq!(temporal.num_passes.get(), 2);
        assert_eq!(temporal.num_obs.get(), 2);

        let out = bm.output_vector(&temporal);
        assert_eq!(out.as_slice(), &[2.0, 0.0, 0.4, 100.0, 2.0, 2.0]);
    }

    #[test]
    fn test_empty_aggregator_list_rejected() {
        let ctx = VariableContext::new(["chl"]).unwrap();
        assert!(BinManager::new(ctx, Vec::new()).is_err());
    }

    #[test]
    fn test_duplicate_output_names_rejected() {
        let ctx = VariableContext::new(["chl"]).unwrap();
        let config = AggregatorConfig::MinMax {
            var_name: "chl".into(),
            target_name: None,
        };
        let aggregators = vec![config.create(&ctx).unwrap(), config.create(&ctx).unwrap()];
        assert!(BinManager::new(ctx, aggregators).is_err());
    }
}
