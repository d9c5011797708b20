//! Maximum-tracking aggregators that carry other variables along.

use super::{prefixed_names, Aggregator};
use crate::bin_context::BinContext;
use crate::error::Result;
use crate::observation::{Observation, VariableContext};
use crate::vector::{Vector, VectorMut};

const MAX: usize = 0;
const MJD: usize = 1;

fn resolve_set_indexes(ctx: &VariableContext, set_var_names: &[String]) -> Result<Vec<usize>> {
    set_var_names
        .iter()
        .map(|name| ctx.require_index(name))
        .collect()
}

/// Write `-inf` into the max slot and NaN everywhere else but the count.
fn reset(vector: &mut VectorMut<'_>, count_slot: Option<usize>) {
    vector.fill(f32::NAN);
    vector.set(MAX, f32::NEG_INFINITY);
    if let Some(count) = count_slot {
        vector.set(count, 0.0);
    }
}

/// Copy a temporal vector to the output, reporting an untouched max as NaN.
fn copy_output(temporal: &Vector<'_>, output: &mut VectorMut<'_>) {
    for i in 0..output.size() {
        output.set(i, temporal.get(i));
    }
    if output.get(MAX) == f32::NEG_INFINITY {
        output.set(MAX, f32::NAN);
    }
}

/// Maximum of a variable, the time it was observed and the values of a set of
/// other variables taken from the same observation.
///
/// Vector layout: `[max, mjd, set...]`. Ties keep the first value seen.
#[derive(Debug, Clone)]
pub struct AggregatorOnMaxSet {
    on_max_index: usize,
    set_indexes: Vec<usize>,
    feature_names: Vec<String>,
}

impl AggregatorOnMaxSet {
    pub fn new(
        ctx: &VariableContext,
        on_max_var_name: &str,
        target_name: Option<&str>,
        set_var_names: &[String],
    ) -> Result<Self> {
        let on_max_index = ctx.require_index(on_max_var_name)?;
        let set_indexes = resolve_set_indexes(ctx, set_var_names)?;
        let prefix = target_name.unwrap_or(on_max_var_name);
        let mut feature_names = prefixed_names(prefix, &["max", "mjd"]);
        feature_names.extend(set_var_names.iter().cloned());
        Ok(Self {
            on_max_index,
            set_indexes,
            feature_names,
        })
    }
}

impl Aggregator for AggregatorOnMaxSet {
    fn name(&self) -> &str {
        "ON_MAX_SET"
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
        reset(spatial, None);
    }

    fn aggregate_spatial(
        &self,
        _ctx: &mut BinContext,
        observation: &Observation,
        spatial: &mut VectorMut<'_>,
    ) {
        let value = observation.get(self.on_max_index);
        if value > spatial.get(MAX) {
            spatial.set(MAX, value);
            spatial.set(MJD, observation.mjd() as f32);
            for (i, &index) in self.set_indexes.iter().enumerate() {
                spatial.set(MJD + 1 + i, observation.get(index));
            }
        }
    }

    fn complete_spatial(&self, _ctx: &mut BinContext, _n: usize, _spatial: &mut VectorMut<'_>) {}

    fn init_temporal(&self, _ctx: &mut BinContext, temporal: &mut VectorMut<'_>) {
        reset(temporal, None);
    }

    fn aggregate_temporal(
        &self,
        _ctx: &mut BinContext,
        spatial: &Vector<'_>,
        _num_spatial_obs: usize,
        temporal: &mut VectorMut<'_>,
    ) {
        if spatial.get(MAX) > temporal.get(MAX) {
            for i in 0..temporal.size() {
                temporal.set(i, spatial.get(i));
            }
        }
    }

    fn compute_output(&self, temporal: &Vector<'_>, output: &mut VectorMut<'_>) {
        copy_output(temporal, output);
    }
}

/// Maximum of a variable over the observations whose mask variable is set.
///
/// Vector layout: `[max, mjd, count, set...]`. `count` is the number of
/// observations that passed the mask, including those whose value was NaN.
/// A NaN or zero mask excludes the observation entirely.
#[derive(Debug, Clone)]
pub struct AggregatorOnMaxSetWithMask {
    on_max_index: usize,
    mask_index: usize,
    set_indexes: Vec<usize>,
    feature_names: Vec<String>,
}

impl AggregatorOnMaxSetWithMask {
    const COUNT: usize = 2;
    const FIRST_SET: usize = 3;

    pub fn new(
        ctx: &VariableContext,
        on_max_var_name: &str,
        mask_var_name: &str,
        target_name: Option<&str>,
        set_var_names: &[String],
    ) -> Result<Self> {
        let on_max_index = ctx.require_index(on_max_var_name)?;
        let mask_index = ctx.require_index(mask_var_name)?;
        let set_indexes = resolve_set_indexes(ctx, set_var_names)?;
        let prefix = target_name.unwrap_or(on_max_var_name);
        let mut feature_names = prefixed_names(prefix, &["max", "mjd", "count"]);
        feature_names.extend(set_var_names.iter().cloned());
        Ok(Self {
            on_max_index,
            mask_index,
            set_indexes,
            feature_names,
        })
    }
}

impl Aggregator for AggregatorOnMaxSetWithMask {
    fn name(&self) -> &str {
        "ON_MAX_SET_WITH_MASK"
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
        reset(spatial, Some(Self::COUNT));
    }

    fn aggregate_spatial(
        &self,
        _ctx: &mut BinContext,
        observation: &Observation,
        spatial: &mut VectorMut<'_>,
    ) {
        let mask = observation.get(self.mask_index);
        if mask == 0.0 || mask.is_nan() {
            return;
        }
        let value = observation.get(self.on_max_index);
        if value > spatial.get(MAX) {
            spatial.set(MAX, value);
            spatial.set(MJD, observation.mjd() as f32);
            for (i, &index) in self.set_indexes.iter().enumerate() {
                spatial.set(Self::FIRST_SET + i, observation.get(index));
            }
        }
        spatial.set(Self::COUNT, spatial.get(Self::COUNT) + 1.0);
    }

    fn complete_spatial(&self, _ctx: &mut BinContext, _n: usize, _spatial: &mut VectorMut<'_>) {}

    fn init_temporal(&self, _ctx: &mut BinContext, temporal: &mut VectorMut<'_>) {
        reset(temporal, Some(Self::COUNT));
    }

    fn aggregate_temporal(
        &self,
        _ctx: &mut BinContext,
        spatial: &Vector<'_>,
        _num_spatial_obs: usize,
        temporal: &mut VectorMut<'_>,
    ) {
        if spatial.get(MAX) > temporal.get(MAX) {
            temporal.set(MAX, spatial.get(MAX));
            temporal.set(MJD, spatial.get(MJD));
            for i in Self::FIRST_SET..temporal.size() {
                temporal.set(i, spatial.get(i));
            }
        }
        temporal.set(
            Self::COUNT,
            temporal.get(Self::COUNT) + spatial.get(Self::COUNT),
        );
    }

    fn compute_output(&self, temporal: &Vector<'_>, output: &mut VectorMut<'_>) {
        copy_output(temporal, output);
    }
}
