//! Observation sources.

use crate::error::{BinningError, Result};
use crate::observation::Observation;

/// A producer of observations grouped into passes (swaths, products, days).
///
/// Each pass can be iterated independently and more than once; passes may be
/// read concurrently from different threads.
pub trait ObservationSource: Sync {
    fn num_passes(&self) -> usize;

    /// Observations of pass `pass`, in acquisition order.
    fn observations(
        &self,
        pass: usize,
    ) -> Result<Box<dyn Iterator<Item = Observation> + Send + '_>>;
}

/// In-memory source, one `Vec` per pass.
#[derive(Debug, Clone, Default)]
pub struct VecObservationSource {
    passes: Vec<Vec<Observation>>,
}

impl VecObservationSource {
    pub fn new(passes: Vec<Vec<Observation>>) -> Self {
        Self { passes }
    }

    pub fn push_pass(&mut self, observations: Vec<Observation>) {
        self.passes.push(observations);
    }

    pub fn total_observations(&self) -> usize {
        self.passes.iter().map(Vec::len).sum()
    }
}

impl ObservationSource for VecObservationSource {
    fn num_passes(&self) -> usize {
        self.passes.len()
    }

    fn observations(
        &self,
        pass: usize,
    ) -> Result<Box<dyn Iterator<Item = Observation> + Send + '_>> {
        let observations = self.passes.get(pass).ok_or_else(|| {
            BinningError::source_failed(format!(
                "pass {pass} requested, source has {} passes",
                self.passes.len()
            ))
        })?;
        Ok(Box::new(observations.iter().cloned()))
    }
}
