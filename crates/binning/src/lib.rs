//! Spatial and temporal binning of geophysical observations
//!
//! This crate aggregates point observations (satellite pixels with a
//! latitude, longitude, time and a set of variable values) onto a planetary
//! grid of bins and reduces them to per-bin statistics. It provides:
//!
//! - **Planetary grids**: equal-area, regular and reduced gaussian grids
//! - **Aggregators**: pluggable per-bin reductions over composite vectors
//! - **Two-level binning**: per-pass spatial vectors merged into temporal ones
//!
//! # Architecture
//!
//! ```text
//! BinningConfig (YAML)
//!      │
//!      ▼
//! BinningContext { grid, bin manager, period, region }
//!      │
//!      ▼
//! Binner::run(source, sink)
//!      │
//!      ├─► SpatialBinner per pass (parallel)
//!      │         │
//!      │         └─► BinManager ─► Aggregator* on sub-vectors
//!      │
//!      ├─► TemporalBinner per bin (parallel)
//!      │
//!      └─► compute_output ─► BinSink (ascending bin index)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use binning::{Binner, BinningConfig, CollectingSink, VecObservationSource};
//!
//! let context = BinningConfig::from_file("binning.yaml")?.create_binning_context()?;
//! let mut sink = CollectingSink::new();
//! let summary = Binner::new(&context).run(&source, &mut sink)?;
//! ```

pub mod aggregator;
pub mod arena;
pub mod bin_context;
pub mod bin_manager;
pub mod binner;
pub mod config;
pub mod context;
pub mod error;
pub mod grid;
pub mod observation;
pub mod period;
pub mod region;
pub mod sink;
pub mod source;
pub mod types;
pub mod unsigned;
pub mod vector;

// Re-export commonly used types at crate root
pub use aggregator::{Aggregator, AggregatorConfig};
pub use bin_context::BinContext;
pub use bin_manager::BinManager;
pub use binner::{Binner, Rejection, SpatialBinner, TemporalBinner};
pub use config::BinningConfig;
pub use context::{BinningContext, BinningContextBuilder, CompositingType};
pub use error::{BinningError, Result};
pub use grid::{
    GridKind, PlanetaryGrid, ReducedGaussianGrid, RegularGaussianGrid, SeaGrid,
};
pub use observation::{Observation, VariableContext};
pub use period::{datetime_from_mjd, mjd_from_date, mjd_from_datetime, DataPeriod, Membership};
pub use region::{BoundingBox, Region};
pub use sink::{BinSink, CollectingSink, JsonLinesSink};
pub use source::{ObservationSource, VecObservationSource};
pub use types::{BinOutput, BinningSummary, SpatialBin, TemporalBin};
pub use unsigned::{UnsignedByte, UnsignedInt, UnsignedShort};
pub use vector::{FeatureVector, Vector, VectorMut};
