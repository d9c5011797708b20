//! Synthetic pass generation.

use crate::config::{ScenarioConfig, SwathConfig};
use binning::{Observation, VecObservationSource};
use rand::prelude::*;

/// Generates seeded synthetic satellite passes.
///
/// Each pass is a north-south swath of `width_deg` at a random longitude
/// inside the scenario bbox. Variable values are drawn per sample:
/// a variable named `mask` is 0 with probability `cloud_fraction` and 1
/// otherwise, a variable named `pass` carries the pass number, every other
/// variable is uniform in `[0, 1)` or NaN with probability `nan_fraction`.
pub struct SwathGenerator {
    swath: SwathConfig,
    variables: Vec<String>,
    rng: StdRng,
}

impl SwathGenerator {
    pub fn new(config: &ScenarioConfig) -> Self {
        // Use seed if provided for reproducible runs, otherwise use entropy
        let rng = if let Some(seed) = config.seed {
            StdRng::seed_from_u64(seed)
        } else {
            StdRng::from_entropy()
        };

        Self {
            swath: config.swath.clone(),
            variables: config.binning.variables.clone(),
            rng,
        }
    }

    /// Generate one pass.
    pub fn next_pass(&mut self, pass: u32) -> Vec<Observation> {
        let bbox = self.swath.bbox;
        let width = self.swath.width_deg.min(bbox.max_lon - bbox.min_lon);
        let west = self.rng.gen_range(bbox.min_lon..=bbox.max_lon - width);
        let mjd = self.swath.start_mjd + pass as f64 * self.swath.pass_interval_days;

        let mut observations = Vec::with_capacity(self.swath.samples_per_pass);
        for i in 0..self.swath.samples_per_pass {
            let lat = self.rng.gen_range(bbox.min_lat..=bbox.max_lat);
            let lon = west + self.rng.gen::<f64>() * width;
            // Samples are acquired in order over about ten minutes.
            let time = mjd + i as f64 / self.swath.samples_per_pass as f64 * 0.007;
            let values = (0..self.variables.len())
                .map(|v| self.value(v, pass))
                .collect();
            observations.push(Observation::new(lat, lon, time, values));
        }
        observations
    }

    /// Generate `passes` passes into an in-memory source.
    pub fn generate(&mut self, passes: u32) -> VecObservationSource {
        let mut source = VecObservationSource::default();
        for pass in 0..passes {
            let observations = self.next_pass(pass);
            source.push_pass(observations);
        }
        source
    }

    fn value(&mut self, variable: usize, pass: u32) -> f32 {
        match self.variables[variable].as_str() {
            "mask" => {
                if self.rng.gen_bool(self.swath.cloud_fraction) {
                    0.0
                } else {
                    1.0
                }
            }
            "pass" => pass as f32,
            _ => {
                if self.rng.gen_bool(self.swath.nan_fraction) {
                    f32::NAN
                } else {
                    self.rng.gen::<f32>()
                }
            }
        }
    }
}
