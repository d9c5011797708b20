//! Spatial binning of one pass.

use crate::arena::BinArena;
use crate::context::{BinningContext, CompositingType};
use crate::grid::normalize_lon;
use crate::observation::Observation;
use crate::period::Membership;
use crate::types::SpatialBin;
use crate::vector::FeatureVector;

/// Why an observation was not binned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    InvalidPosition,
    OutsideRegion,
    OutsidePeriod,
    /// Mosaicking only: the bin already holds an observation of this pass.
    AlreadyMosaicked,
}

/// Accumulates the observations of one pass into per-bin spatial vectors.
///
/// The binner owns its arena exclusively, so passes can be binned on
/// separate threads without sharing any bin state.
pub struct SpatialBinner<'a> {
    context: &'a BinningContext,
    arena: BinArena,
    num_binned: u64,
    num_rejected: u64,
}

impl<'a> SpatialBinner<'a> {
    pub fn new(context: &'a BinningContext) -> Self {
        let stride = context.bin_manager().spatial_layout().size();
        Self {
            context,
            arena: BinArena::new(stride),
            num_binned: 0,
            num_rejected: 0,
        }
    }

    /// Bin one observation.
    pub fn process_observation(&mut self, observation: &Observation) -> Result<i64, Rejection> {
        if let Err(reason) = self.check(observation) {
            self.num_rejected += 1;
            return Err(reason);
        }

        let index = self
            .context
            .planetary_grid()
            .bin_index(observation.lat(), observation.lon());
        if self.context.compositing_type() == CompositingType::Mosaicking
            && self.arena.contains(index)
        {
            self.num_rejected += 1;
            return Err(Rejection::AlreadyMosaicked);
        }

        let context = self.context;
        let bin_manager = context.bin_manager();
        let slot = self
            .arena
            .slot_or_insert_with(index, |ctx, vector| bin_manager.init_spatial(ctx, vector));
        let (ctx, mut vector) = self.arena.slot_mut(slot);
        bin_manager.aggregate_spatial(ctx, observation, &mut vector);
        self.arena.increment_obs(slot);
        self.num_binned += 1;
        Ok(index)
    }

    /// Bin every observation of `observations`.
    pub fn process<I>(&mut self, observations: I)
    where
        I: IntoIterator<Item = Observation>,
    {
        for observation in observations {
            // Rejections are counted, not reported.
            let _ = self.process_observation(&observation);
        }
    }

    fn check(&self, observation: &Observation) -> Result<(), Rejection> {
        let (lat, lon) = (observation.lat(), observation.lon());
        if !lat.is_finite() || !lon.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(Rejection::InvalidPosition);
        }
        // Filters see the same longitude the grid bins by.
        let lon = normalize_lon(lon);
        if let Some(region) = self.context.region() {
            if !region.contains(lat, lon) {
                return Err(Rejection::OutsideRegion);
            }
        }
        if let Some(period) = self.context.data_period() {
            if period.membership(lon, observation.mjd()) != Membership::Current {
                return Err(Rejection::OutsidePeriod);
            }
        }
        Ok(())
    }

    pub fn num_binned(&self) -> u64 {
        self.num_binned
    }

    pub fn num_rejected(&self) -> u64 {
        self.num_rejected
    }

    /// Number of bins touched so far.
    pub fn num_bins(&self) -> usize {
        self.arena.len()
    }

    /// Complete every touched bin and return them in ascending index order.
    pub fn complete(mut self) -> Vec<SpatialBin> {
        let context = self.context;
        let bin_manager = context.bin_manager();
        let slots = self.arena.sorted_slots();
        let mut bins = Vec::with_capacity(slots.len());
        for slot in slots {
            let index = self.arena.bin_index(slot);
            let num_obs = self.arena.num_obs(slot);
            let (ctx, mut vector) = self.arena.slot_mut(slot);
            bin_manager.complete_spatial(ctx, num_obs, &mut vector);
            bins.push(SpatialBin {
                index,
                num_obs,
                features: FeatureVector::from_vec(vector.as_slice().to_vec()),
            });
        }
        bins
    }
}
