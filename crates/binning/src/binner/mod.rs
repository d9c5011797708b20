//! The binning driver.
//!
//! ```text
//! ObservationSource ──► pass 0 ─► SpatialBinner ─┐
//!                   ──► pass 1 ─► SpatialBinner ─┼─► group by bin index
//!                   ──► pass n ─► SpatialBinner ─┘          │
//!                                                           ▼
//!                         BinSink ◄── compute_output ◄── TemporalBinner
//! ```
//!
//! Passes are binned in parallel, each by its own [`SpatialBinner`]. Spatial
//! bins of the same index are merged in pass order, so the result does not
//! depend on thread scheduling.

mod spatial;
mod temporal;

pub use spatial::{Rejection, SpatialBinner};
pub use temporal::TemporalBinner;

use crate::context::BinningContext;
use crate::error::Result;
use crate::sink::BinSink;
use crate::source::ObservationSource;
use crate::types::{BinOutput, BinningSummary, SpatialBin};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, warn};

struct PassResult {
    bins: Vec<SpatialBin>,
    num_read: u64,
    num_binned: u64,
}

/// Runs spatial and temporal binning over a whole source.
pub struct Binner<'a> {
    context: &'a BinningContext,
}

impl<'a> Binner<'a> {
    pub fn new(context: &'a BinningContext) -> Self {
        Self { context }
    }

    /// Bin every pass of `source` and hand the output bins to `sink` in
    /// ascending index order.
    pub fn run(
        &self,
        source: &dyn ObservationSource,
        sink: &mut dyn BinSink,
    ) -> Result<BinningSummary> {
        let start = Instant::now();
        let num_passes = source.num_passes();
        info!(
            num_passes,
            num_bins = self.context.planetary_grid().num_bins(),
            compositing = ?self.context.compositing_type(),
            "Starting binning run"
        );

        let passes = (0..num_passes)
            .into_par_iter()
            .map(|pass| self.bin_pass(source, pass))
            .collect::<Result<Vec<_>>>()?;

        let mut summary = BinningSummary {
            num_passes,
            ..Default::default()
        };
        let mut grouped: BTreeMap<i64, Vec<SpatialBin>> = BTreeMap::new();
        for pass in passes {
            summary.num_observations += pass.num_read;
            summary.num_binned += pass.num_binned;
            summary.num_spatial_bins += pass.bins.len();
            for bin in pass.bins {
                grouped.entry(bin.index).or_default().push(bin);
            }
        }

        let temporal_binner = TemporalBinner::new(self.context);
        let outputs = grouped
            .par_iter()
            .map(|(&index, bins)| {
                let temporal = temporal_binner.process_spatial_bins(index, bins)?;
                temporal_binner.compute_output(&temporal)
            })
            .collect::<Result<Vec<BinOutput>>>()?;

        if outputs.is_empty() {
            warn!(
                num_observations = summary.num_observations,
                "Binning produced no bins"
            );
        }

        sink.begin(self.context.bin_manager().output_feature_names())?;
        summary.num_output_bins = outputs.len();
        for output in outputs {
            sink.consume(output)?;
        }
        sink.finish()?;

        summary.elapsed_ms = start.elapsed().as_millis() as u64;
        info!(
            num_observations = summary.num_observations,
            num_binned = summary.num_binned,
            num_output_bins = summary.num_output_bins,
            elapsed_ms = summary.elapsed_ms,
            "Binning run complete"
        );
        Ok(summary)
    }

    fn bin_pass(&self, source: &dyn ObservationSource, pass: usize) -> Result<PassResult> {
        let mut binner = SpatialBinner::new(self.context);
        let mut num_read = 0u64;
        for observation in source.observations(pass)? {
            num_read += 1;
            // Rejections are counted by the binner.
            let _ = binner.process_observation(&observation);
        }
        let num_binned = binner.num_binned();
        debug!(
            pass,
            num_read,
            num_binned,
            num_rejected = binner.num_rejected(),
            num_bins = binner.num_bins(),
            "Spatial pass complete"
        );
        Ok(PassResult {
            bins: binner.complete(),
            num_read,
            num_binned,
        })
    }
}
