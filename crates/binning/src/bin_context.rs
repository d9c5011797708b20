//! Per-bin scratch storage for aggregators.

use std::any::Any;
use std::collections::HashMap;

/// Key/value store scoped to one bin in one phase.
///
/// Aggregators use it for state that has no slot in the feature vector, such
/// as a count of skipped NaN inputs or the list of per-pass values a
/// percentile is computed from. Keys should be prefixed with the aggregator's
/// target name so aggregators never see each other's entries.
#[derive(Debug, Default)]
pub struct BinContext {
    index: i64,
    values: HashMap<String, Box<dyn Any + Send>>,
}

impl BinContext {
    pub fn new(index: i64) -> Self {
        Self {
            index,
            values: HashMap::new(),
        }
    }

    /// Index of the bin this context belongs to.
    pub fn index(&self) -> i64 {
        self.index
    }

    pub fn get<T: 'static>(&self, key: &str) -> Option<&T> {
        self.values.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    pub fn get_mut<T: 'static>(&mut self, key: &str) -> Option<&mut T> {
        self.values.get_mut(key).and_then(|v| v.downcast_mut::<T>())
    }

    /// Get the entry for `key`, inserting `T::default()` first if absent or of
    /// another type.
    pub fn entry<T: Default + Send + 'static>(&mut self, key: &str) -> &mut T {
        let present = self
            .values
            .get(key)
            .map(|v| v.is::<T>())
            .unwrap_or(false);
        if !present {
            self.values.insert(key.to_string(), Box::new(T::default()));
        }
        self.values
            .get_mut(key)
            .and_then(|v| v.downcast_mut::<T>())
            .expect("entry was just inserted with this type")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get() {
        let mut ctx = BinContext::new(42);
        *ctx.entry::<i64>("avg.invalid") = 3;
        assert_eq!(ctx.index(), 42);
        assert_eq!(ctx.get::<i64>("avg.invalid"), Some(&3));
        assert_eq!(ctx.get::<f32>("avg.invalid"), None);
        assert_eq!(ctx.get::<i64>("missing"), None);
    }

    #[test]
    fn test_entry_default_and_update() {
        let mut ctx = BinContext::new(0);
        ctx.entry::<Vec<f32>>("p.values").push(1.0);
        ctx.entry::<Vec<f32>>("p.values").push(2.0);
        assert_eq!(ctx.get::<Vec<f32>>("p.values").unwrap(), &vec![1.0, 2.0]);
    }
}
