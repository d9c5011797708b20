//! Observations and the variable context used to address their values.

use crate::error::{BinningError, Result};
use std::collections::HashMap;

/// One raw measurement: where and when it was taken and the values of every
/// variable in the [`VariableContext`], in context order.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    lat: f64,
    lon: f64,
    mjd: f64,
    values: Vec<f32>,
}

impl Observation {
    pub fn new(lat: f64, lon: f64, mjd: f64, values: Vec<f32>) -> Self {
        Self {
            lat,
            lon,
            mjd,
            values,
        }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Acquisition time as modified Julian day.
    pub fn mjd(&self) -> f64 {
        self.mjd
    }

    /// Value of the variable at `index`. Missing trailing values read as NaN.
    #[inline]
    pub fn get(&self, index: usize) -> f32 {
        self.values.get(index).copied().unwrap_or(f32::NAN)
    }

    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }
}

/// Name → index table for observation variables.
///
/// Built once per run and shared read-only by every aggregator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableContext {
    names: Vec<String>,
    indexes: HashMap<String, usize>,
}

impl VariableContext {
    /// Build a context from ordered variable names. Duplicate names are rejected.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut context = Self::default();
        for name in names {
            let name = name.into();
            if context.indexes.contains_key(&name) {
                return Err(BinningError::config(format!(
                    "variable '{name}' defined more than once"
                )));
            }
            context.indexes.insert(name.clone(), context.names.len());
            context.names.push(name);
        }
        Ok(context)
    }

    pub fn variable_count(&self) -> usize {
        self.names.len()
    }

    pub fn variable_name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn variable_index(&self, name: &str) -> Option<usize> {
        self.indexes.get(name).copied()
    }

    /// Like [`variable_index`](Self::variable_index) but fails with
    /// [`BinningError::UnknownVariable`].
    pub fn require_index(&self, name: &str) -> Result<usize> {
        self.variable_index(name)
            .ok_or_else(|| BinningError::unknown_variable(name))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_context_indexes() {
        let ctx = VariableContext::new(["chl", "tsm", "mask"]).unwrap();
        assert_eq!(ctx.variable_count(), 3);
        assert_eq!(ctx.variable_index("tsm"), Some(1));
        assert_eq!(ctx.variable_name(2), Some("mask"));
        assert_eq!(ctx.variable_index("sst"), None);
    }

    #[test]
    fn test_require_index_unknown() {
        let ctx = VariableContext::new(["chl"]).unwrap();
        let err = ctx.require_index("sst").unwrap_err();
        assert!(matches!(err, BinningError::UnknownVariable { ref name } if name == "sst"));
    }

    #[test]
    fn test_duplicate_variable_rejected() {
        assert!(VariableContext::new(["a", "b", "a"]).is_err());
    }

    #[test]
    fn test_observation_missing_value_is_nan() {
        let obs = Observation::new(10.0, 20.0, 55000.5, vec![1.0]);
        assert_eq!(obs.get(0), 1.0);
        assert!(obs.get(1).is_nan());
    }
}
