//! Minimum and maximum.

use super::{prefixed_names, Aggregator};
use crate::bin_context::BinContext;
use crate::error::Result;
use crate::observation::{Observation, VariableContext};
use crate::vector::{Vector, VectorMut};

const MIN: usize = 0;
const MAX: usize = 1;

/// Minimum and maximum of a variable; layout `[min, max]` in every phase.
/// Bins that never saw a valid value report NaN for both.
#[derive(Debug, Clone)]
pub struct AggregatorMinMax {
    var_index: usize,
    feature_names: Vec<String>,
}

impl AggregatorMinMax {
    pub fn new(ctx: &VariableContext, var_name: &str, target_name: Option<&str>) -> Result<Self> {
        let var_index = ctx.require_index(var_name)?;
        let prefix = target_name.unwrap_or(var_name);
        Ok(Self {
            var_index,
            feature_names: prefixed_names(prefix, &["min", "max"]),
        })
    }
}

fn reset(vector: &mut VectorMut<'_>) {
    vector.set(MIN, f32::INFINITY);
    vector.set(MAX, f32::NEG_INFINITY);
}

fn merge(vector: &mut VectorMut<'_>, min: f32, max: f32) {
    // NaN comparisons are false, so NaN inputs never replace a value.
    if min < vector.get(MIN) {
        vector.set(MIN, min);
    }
    if max > vector.get(MAX) {
        vector.set(MAX, max);
    }
}

impl Aggregator for AggregatorMinMax {
    fn name(&self) -> &str {
        "MIN_MAX"
    }

    fn spatial_feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn temporal_feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn output_feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn init_spatial(&self, _ctx: &mut BinContext, spatial: &mut VectorMut<'_>) {
        reset(spatial);
    }

    fn aggregate_spatial(
        &self,
        _ctx: &mut BinContext,
        observation: &Observation,
        spatial: &mut VectorMut<'_>,
    ) {
        let value = observation.get(self.var_index);
        merge(spatial, value, value);
    }

    fn complete_spatial(&self, _ctx: &mut BinContext, _n: usize, _spatial: &mut VectorMut<'_>) {}

    fn init_temporal(&self, _ctx: &mut BinContext, temporal: &mut VectorMut<'_>) {
        reset(temporal);
    }

    fn aggregate_temporal(
        &self,
        _ctx: &mut BinContext,
        spatial: &Vector<'_>,
        _num_spatial_obs: usize,
        temporal: &mut VectorMut<'_>,
    ) {
        merge(temporal, spatial.get(MIN), spatial.get(MAX));
    }

    fn compute_output(&self, temporal: &Vector<'_>, output: &mut VectorMut<'_>) {
        let min = temporal.get(MIN);
        let max = temporal.get(MAX);
        output.set(MIN, if min == f32::INFINITY { f32::NAN } else { min });
        output.set(MAX, if max == f32::NEG_INFINITY { f32::NAN } else { max });
    }
}
