//! Mean and standard deviation.

use super::{prefixed_names, Aggregator};
use crate::bin_context::BinContext;
use crate::error::{BinningError, Result};
use crate::observation::{Observation, VariableContext};
use crate::vector::{Vector, VectorMut};

const SUM_X: usize = 0;
const SUM_XX: usize = 1;
const SUM_W: usize = 2;

/// Mean and sigma of a variable.
///
/// Spatial layout `[sum_x, sum_xx (, counts)]`. NaN inputs are skipped and
/// tallied in the bin context; `complete_spatial` turns the sums into
/// per-pass means over the valid inputs.
///
/// Temporal layout `[sum_x, sum_xx, sum_w (, counts)]`. Each pass contributes
/// with weight `num_spatial_obs ^ weight_coeff`, so a coefficient of 0 weighs
/// passes equally and 1 weighs them by observation count.
///
/// Output layout `[mean, sigma (, counts)]`.
#[derive(Debug, Clone)]
pub struct AggregatorAverage {
    var_index: usize,
    weight_coeff: f64,
    output_counts: bool,
    invalid_key: String,
    spatial_names: Vec<String>,
    temporal_names: Vec<String>,
    output_names: Vec<String>,
}

impl AggregatorAverage {
    pub fn new(
        ctx: &VariableContext,
        var_name: &str,
        target_name: Option<&str>,
        weight_coeff: f64,
        output_counts: bool,
    ) -> Result<Self> {
        let var_index = ctx.require_index(var_name)?;
        if !weight_coeff.is_finite() || weight_coeff < 0.0 {
            return Err(BinningError::config(format!(
                "weight_coeff must be a finite value >= 0, got {weight_coeff}"
            )));
        }
        let prefix = target_name.unwrap_or(var_name);
        let with_counts = |mut names: Vec<String>| {
            if output_counts {
                names.push(format!("{prefix}_counts"));
            }
            names
        };
        Ok(Self {
            var_index,
            weight_coeff,
            output_counts,
            invalid_key: format!("{prefix}.avg.invalid"),
            spatial_names: with_counts(prefixed_names(prefix, &["sum_x", "sum_xx"])),
            temporal_names: with_counts(prefixed_names(prefix, &["sum_x", "sum_xx", "sum_w"])),
            output_names: with_counts(prefixed_names(prefix, &["mean", "sigma"])),
        })
    }

    fn weight(&self, num_spatial_obs: usize) -> f32 {
        if self.weight_coeff == 0.0 {
            1.0
        } else {
            (num_spatial_obs as f64).powf(self.weight_coeff) as f32
        }
    }
}

impl Aggregator for AggregatorAverage {
    fn name(&self) -> &str {
        "AVG"
    }

    fn spatial_feature_names(&self) -> &[String] {
        &self.spatial_names
    }

    fn temporal_feature_names(&self) -> &[String] {
        &self.temporal_names
    }

    fn output_feature_names(&self) -> &[String] {
        &self.output_names
    }

    fn init_spatial(&self, _ctx: &mut BinContext, spatial: &mut VectorMut<'_>) {
        spatial.fill(0.0);
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
            return;
        }
        spatial.set(SUM_X, spatial.get(SUM_X) + value);
        spatial.set(SUM_XX, spatial.get(SUM_XX) + value * value);
    }

    fn complete_spatial(
        &self,
        ctx: &mut BinContext,
        num_spatial_obs: usize,
        spatial: &mut VectorMut<'_>,
    ) {
        let invalid = ctx.get::<usize>(&self.invalid_key).copied().unwrap_or(0);
        let valid = num_spatial_obs.saturating_sub(invalid);
        if valid > 0 {
            let n = valid as f32;
            spatial.set(SUM_X, spatial.get(SUM_X) / n);
            spatial.set(SUM_XX, spatial.get(SUM_XX) / n);
        } else {
            spatial.set(SUM_X, f32::NAN);
            spatial.set(SUM_XX, f32::NAN);
        }
        if self.output_counts {
            spatial.set(2, valid as f32);
        }
    }

    fn init_temporal(&self, _ctx: &mut BinContext, temporal: &mut VectorMut<'_>) {
        temporal.fill(0.0);
    }

    fn aggregate_temporal(
        &self,
        _ctx: &mut BinContext,
        spatial: &Vector<'_>,
        num_spatial_obs: usize,
        temporal: &mut VectorMut<'_>,
    ) {
        let mean = spatial.get(SUM_X);
        if mean.is_nan() {
            return;
        }
        let w = self.weight(num_spatial_obs);
        temporal.set(SUM_X, temporal.get(SUM_X) + mean * w);
        temporal.set(SUM_XX, temporal.get(SUM_XX) + spatial.get(SUM_XX) * w);
        temporal.set(SUM_W, temporal.get(SUM_W) + w);
        if self.output_counts {
            temporal.set(3, temporal.get(3) + spatial.get(2));
        }
    }

    fn compute_output(&self, temporal: &Vector<'_>, output: &mut VectorMut<'_>) {
        let sum_w = temporal.get(SUM_W);
        if sum_w > 0.0 {
            let mean = temporal.get(SUM_X) / sum_w;
            let variance = temporal.get(SUM_XX) / sum_w - mean * mean;
            output.set(0, mean);
            output.set(1, variance.max(0.0).sqrt());
        } else {
            output.set(0, f32::NAN);
            output.set(1, f32::NAN);
        }
        if self.output_counts {
            output.set(2, temporal.get(3));
        }
    }
}
