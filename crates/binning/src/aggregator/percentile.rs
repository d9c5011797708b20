//! Percentile of per-pass means.

use super::Aggregator;
use crate::bin_context::BinContext;
use crate::error::{BinningError, Result};
use crate::observation::{Observation, VariableContext};
use crate::vector::{Vector, VectorMut};

/// The `percentage`-th percentile of the per-pass means of a variable.
///
/// Spatial layout `[sum]` (the pass mean after completion); temporal and
/// output layout `[p<percentage>]`. The pass means of a bin are collected in
/// its temporal bin context and reduced in `complete_temporal`.
#[derive(Debug, Clone)]
pub struct AggregatorPercentile {
    var_index: usize,
    percentage: u32,
    invalid_key: String,
    values_key: String,
    spatial_names: Vec<String>,
    temporal_names: Vec<String>,
}

impl AggregatorPercentile {
    pub const DEFAULT_PERCENTAGE: u32 = 90;

    pub fn new(
        ctx: &VariableContext,
        var_name: &str,
        target_name: Option<&str>,
        percentage: u32,
    ) -> Result<Self> {
        let var_index = ctx.require_index(var_name)?;
        if percentage > 100 {
            return Err(BinningError::config(format!(
                "percentage must be in [0, 100], got {percentage}"
            )));
        }
        let prefix = target_name.unwrap_or(var_name);
        Ok(Self {
            var_index,
            percentage,
            invalid_key: format!("{prefix}.pct.invalid"),
            values_key: format!("{prefix}.pct.values"),
            spatial_names: vec![format!("{prefix}_sum")],
            temporal_names: vec![format!("{prefix}_p{percentage}")],
        })
    }

    pub fn percentage(&self) -> u32 {
        self.percentage
    }
}

impl Aggregator for AggregatorPercentile {
    fn name(&self) -> &str {
        "PERCENTILE"
    }

    fn spatial_feature_names(&self) -> &[String] {
        &self.spatial_names
    }

    fn temporal_feature_names(&self) -> &[String] {
        &self.temporal_names
    }

    fn output_feature_names(&self) -> &[String] {
        &self.temporal_names
    }

    fn init_spatial(&self, _ctx: &mut BinContext, spatial: &mut VectorMut<'_>) {
        spatial.set(0, 0.0);
    }

    fn aggregate_spatial(
        &self,
        ctx: &mut BinContext,
        observation: &Observation,
        spatial: &mut VectorMut<'_>,
    ) {
        let value = observation.get(self.var_index);
        if value.is_nan() {
            *ctx.entry::<usize>(&self.invalid_key) += 1;
        } else {
            spatial.set(0, spatial.get(0) + value);
        }
    }

    fn complete_spatial(
        &self,
        ctx: &mut BinContext,
        num_spatial_obs: usize,
        spatial: &mut VectorMut<'_>,
    ) {
        let invalid = ctx.get::<usize>(&self.invalid_key).copied().unwrap_or(0);
        let valid = num_spatial_obs.saturating_sub(invalid);
        let mean = if valid > 0 {
            spatial.get(0) / valid as f32
        } else {
            f32::NAN
        };
        spatial.set(0, mean);
    }

    fn init_temporal(&self, _ctx: &mut BinContext, temporal: &mut VectorMut<'_>) {
        temporal.set(0, f32::NAN);
    }

    fn aggregate_temporal(
        &self,
        ctx: &mut BinContext,
        spatial: &Vector<'_>,
        _num_spatial_obs: usize,
        _temporal: &mut VectorMut<'_>,
    ) {
        let mean = spatial.get(0);
        if !mean.is_nan() {
            ctx.entry::<Vec<f32>>(&self.values_key).push(mean);
        }
    }

    fn complete_temporal(
        &self,
        ctx: &mut BinContext,
        _num_temporal_obs: usize,
        temporal: &mut VectorMut<'_>,
    ) {
        let value = match ctx.get_mut::<Vec<f32>>(&self.values_key) {
            Some(values) if !values.is_empty() => {
                values.sort_by(f32::total_cmp);
                compute_percentile(self.percentage, values)
            }
            _ => f32::NAN,
        };
        temporal.set(0, value);
    }

    fn compute_output(&self, temporal: &Vector<'_>, output: &mut VectorMut<'_>) {
        output.set(0, temporal.get(0));
    }
}

/// Percentile of ascending `sorted` values, interpolating linearly between
/// neighbours. `sorted` must not be empty.
pub fn compute_percentile(percentage: u32, sorted: &[f32]) -> f32 {
    let count = sorted.len();
    let rank = (percentage as f32 / 100.0) * (count - 1) as f32 + 1.0;
    if rank <= 1.0 {
        return sorted[0];
    }
    if rank >= count as f32 {
        return sorted[count - 1];
    }
    let k = rank as usize;
    let d = rank - k as f32;
    sorted[k - 1] + d * (sorted[k] - sorted[k - 1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::FeatureVector;

    #[test]
    fn test_compute_percentile() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(compute_percentile(0, &values), 1.0);
        assert_eq!(compute_percentile(50, &values), 3.0);
        assert_eq!(compute_percentile(100, &values), 5.0);
        assert!((compute_percentile(90, &values) - 4.6).abs() < 1e-6);
        assert_eq!(compute_percentile(90, &[7.0]), 7.0);
    }

    #[test]
    fn test_percentile_over_passes() {
        let ctx = VariableContext::new(["chl"]).unwrap();
        let agg = AggregatorPercentile::new(&ctx, "chl", None, 50).unwrap();
        assert_eq!(agg.spatial_feature_names(), &["chl_sum"]);
        assert_eq!(agg.output_feature_names(), &["chl_p50"]);

        let mut tctx = BinContext::new(3);
        let mut t = FeatureVector::new(1);
        agg.init_temporal(&mut tctx, &mut t.view_mut());

        for pass in [vec![4.0, 6.0], vec![1.0], vec![f32::NAN], vec![9.0, f32::NAN]] {
            let mut sctx = BinContext::new(3);
            let mut s = FeatureVector::new(1);
            agg.init_spatial(&mut sctx, &mut s.view_mut());
            for v in &pass {
                let obs = Observation::new(0.0, 0.0, 0.0, vec![*v]);
                agg.aggregate_spatial(&mut sctx, &obs, &mut s.view_mut());
            }
            agg.complete_spatial(&mut sctx, pass.len(), &mut s.view_mut());
            agg.aggregate_temporal(&mut tctx, &s.view(), pass.len(), &mut t.view_mut());
        }
        agg.complete_temporal(&mut tctx, 4, &mut t.view_mut());
        // pass means 5, 1, (skipped), 9 -> median 5
        assert_eq!(t.get(0), 5.0);

        let mut out = FeatureVector::new(1);
        agg.compute_output(&t.view(), &mut out.view_mut());
        assert_eq!(out.get(0), 5.0);
    }

    #[test]
    fn test_no_valid_pass_yields_nan() {
        let ctx = VariableContext::new(["chl"]).unwrap();
        let agg = AggregatorPercentile::new(&ctx, "chl", None, 90).unwrap();
        let mut tctx = BinContext::new(0);
        let mut t = FeatureVector::new(1);
        agg.init_temporal(&mut tctx, &mut t.view_mut());
        agg.complete_temporal(&mut tctx, 0, &mut t.view_mut());
        assert!(t.get(0).is_nan());
    }

    #[test]
    fn test_percentage_range() {
        let ctx = VariableContext::new(["chl"]).unwrap();
        assert!(AggregatorPercentile::new(&ctx, "chl", None, 101).is_err());
    }
}
