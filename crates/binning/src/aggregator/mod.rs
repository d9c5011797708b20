//! Aggregators: the per-bin reduction algorithms.
//!
//! Each aggregator owns a contiguous range of slots in the spatial, temporal
//! and output vectors of a bin and sees only that range. One bin moves through
//! the phases
//!
//! ```text
//! init_spatial ─► aggregate_spatial* ─► complete_spatial      (once per pass)
//!                                             │
//! init_temporal ─► aggregate_temporal* ◄──────┘ ─► complete_temporal
//!                                                       │
//!                                   compute_output ◄────┘
//! ```
//!
//! Aggregators hold configuration only; all per-bin state lives in the
//! vectors and the [`BinContext`].

mod average;
mod min_max;
mod on_max_set;
mod percentile;

use crate::bin_context::BinContext;
use crate::error::Result;
use crate::observation::{Observation, VariableContext};
use crate::vector::{Vector, VectorMut};
use serde::{Deserialize, Serialize};

pub use average::AggregatorAverage;
pub use min_max::AggregatorMinMax;
pub use on_max_set::{AggregatorOnMaxSet, AggregatorOnMaxSetWithMask};
pub use percentile::{compute_percentile, AggregatorPercentile};

/// A per-bin reduction strategy.
pub trait Aggregator: Send + Sync + std::fmt::Debug {
    /// Short type name, e.g. `"AVG"`.
    fn name(&self) -> &str;

    /// Slot names of the spatial vector, in slot order.
    fn spatial_feature_names(&self) -> &[String];

    /// Slot names of the temporal vector, in slot order.
    fn temporal_feature_names(&self) -> &[String];

    /// Slot names of the output vector, in slot order.
    fn output_feature_names(&self) -> &[String];

    /// Reset `spatial` to the identity of the aggregation.
    fn init_spatial(&self, ctx: &mut BinContext, spatial: &mut VectorMut<'_>);

    /// Fold one observation into `spatial`.
    fn aggregate_spatial(
        &self,
        ctx: &mut BinContext,
        observation: &Observation,
        spatial: &mut VectorMut<'_>,
    );

    /// Finish a spatial pass. `num_spatial_obs` counts every observation the
    /// bin received in the pass.
    fn complete_spatial(
        &self,
        ctx: &mut BinContext,
        num_spatial_obs: usize,
        spatial: &mut VectorMut<'_>,
    );

    /// Reset `temporal` to the identity of the aggregation.
    fn init_temporal(&self, ctx: &mut BinContext, temporal: &mut VectorMut<'_>);

    /// Fold one completed spatial vector into `temporal`.
    fn aggregate_temporal(
        &self,
        ctx: &mut BinContext,
        spatial: &Vector<'_>,
        num_spatial_obs: usize,
        temporal: &mut VectorMut<'_>,
    );

    /// Finish temporal aggregation. `num_temporal_obs` is the number of
    /// spatial vectors merged.
    fn complete_temporal(
        &self,
        _ctx: &mut BinContext,
        _num_temporal_obs: usize,
        _temporal: &mut VectorMut<'_>,
    ) {
    }

    /// Derive the reported features from a completed temporal vector.
    fn compute_output(&self, temporal: &Vector<'_>, output: &mut VectorMut<'_>);
}

/// Aggregator configuration as it appears in a binning config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AggregatorConfig {
    /// Mean and standard deviation.
    #[serde(rename = "AVG")]
    Average {
        var_name: String,
        #[serde(default)]
        target_name: Option<String>,
        #[serde(default)]
        weight_coeff: Option<f64>,
        #[serde(default)]
        output_counts: bool,
    },

    /// Minimum and maximum.
    #[serde(rename = "MIN_MAX")]
    MinMax {
        var_name: String,
        #[serde(default)]
        target_name: Option<String>,
    },

    /// Maximum, its time and the values of other variables at the maximum.
    #[serde(rename = "ON_MAX_SET")]
    OnMaxSet {
        on_max_var_name: String,
        #[serde(default)]
        target_name: Option<String>,
        #[serde(default)]
        set_var_names: Vec<String>,
    },

    /// Like `ON_MAX_SET`, considering only observations whose mask is set,
    /// plus a count of those observations.
    #[serde(rename = "ON_MAX_SET_WITH_MASK")]
    OnMaxSetWithMask {
        on_max_var_name: String,
        mask_var_name: String,
        #[serde(default)]
        target_name: Option<String>,
        #[serde(default)]
        set_var_names: Vec<String>,
    },

    /// Percentile of the per-pass means.
    #[serde(rename = "PERCENTILE")]
    Percentile {
        var_name: String,
        #[serde(default)]
        target_name: Option<String>,
        #[serde(default)]
        percentage: Option<u32>,
    },
}

impl AggregatorConfig {
    /// Build the aggregator, resolving variable names against `ctx`.
    pub fn create(&self, ctx: &VariableContext) -> Result<Box<dyn Aggregator>> {
        let aggregator: Box<dyn Aggregator> = match self {
            Self::Average {
                var_name,
                target_name,
                weight_coeff,
                output_counts,
            } => Box::new(AggregatorAverage::new(
                ctx,
                var_name,
                target_name.as_deref(),
                weight_coeff.unwrap_or(0.0),
                *output_counts,
            )?),
            Self::MinMax {
                var_name,
                target_name,
            } => Box::new(AggregatorMinMax::new(ctx, var_name, target_name.as_deref())?),
            Self::OnMaxSet {
                on_max_var_name,
                target_name,
                set_var_names,
            } => Box::new(AggregatorOnMaxSet::new(
                ctx,
                on_max_var_name,
                target_name.as_deref(),
                set_var_names,
            )?),
            Self::OnMaxSetWithMask {
                on_max_var_name,
                mask_var_name,
                target_name,
                set_var_names,
            } => Box::new(AggregatorOnMaxSetWithMask::new(
                ctx,
                on_max_var_name,
                mask_var_name,
                target_name.as_deref(),
                set_var_names,
            )?),
            Self::Percentile {
                var_name,
                target_name,
                percentage,
            } => Box::new(AggregatorPercentile::new(
                ctx,
                var_name,
                target_name.as_deref(),
                percentage.unwrap_or(AggregatorPercentile::DEFAULT_PERCENTAGE),
            )?),
        };
        Ok(aggregator)
    }
}

/// `"{prefix}_{suffix}"` for every suffix.
pub(crate) fn prefixed_names(prefix: &str, suffixes: &[&str]) -> Vec<String> {
    suffixes.iter().map(|s| format!("{prefix}_{s}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
- type: AVG
  var_name: chl
  weight_coeff: 0.5
- type: ON_MAX_SET_WITH_MASK
  on_max_var_name: ndvi
  mask_var_name: cloud_free
  set_var_names: [red, nir]
- type: PERCENTILE
  var_name: chl
  percentage: 50
"#;
        let configs: Vec<AggregatorConfig> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(configs.len(), 3);
        assert!(matches!(
            &configs[0],
            AggregatorConfig::Average { var_name, weight_coeff: Some(c), output_counts: false, .. }
                if var_name == "chl" && *c == 0.5
        ));
        assert!(matches!(
            &configs[1],
            AggregatorConfig::OnMaxSetWithMask { set_var_names, .. } if set_var_names.len() == 2
        ));
    }

    #[test]
    fn test_create_resolves_variables() {
        let ctx = VariableContext::new(["ndvi", "cloud_free", "red"]).unwrap();
        let config = AggregatorConfig::OnMaxSetWithMask {
            on_max_var_name: "ndvi".into(),
            mask_var_name: "cloud_free".into(),
            target_name: None,
            set_var_names: vec!["red".into()],
        };
        let agg = config.create(&ctx).unwrap();
        assert_eq!(agg.name(), "ON_MAX_SET_WITH_MASK");
        assert_eq!(
            agg.output_feature_names(),
            &["ndvi_max", "ndvi_mjd", "ndvi_count", "red"]
        );
    }

    #[test]
    fn test_create_unknown_variable() {
        let ctx = VariableContext::new(["ndvi"]).unwrap();
        let config = AggregatorConfig::MinMax {
            var_name: "sst".into(),
            target_name: None,
        };
        assert!(config.create(&ctx).is_err());
    }
}
