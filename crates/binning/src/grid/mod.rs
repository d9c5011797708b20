//! Planetary grids: mapping between geographic coordinates and bin indices.
//!
//! Every grid enumerates its bins densely, row by row, starting at 0:
//!
//! ```text
//! row 0:  [ first_bin_index(0) .. first_bin_index(0) + num_cols(0) )
//! row 1:  [ first_bin_index(1) .. first_bin_index(1) + num_cols(1) )
//! ...
//! first_bin_index(r + 1) == first_bin_index(r) + num_cols(r)
//! ```
//!
//! Rows run from north to south.

pub mod gaussian;
pub mod sea;
pub mod tables;

use crate::error::{BinningError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use gaussian::{ReducedGaussianGrid, RegularGaussianGrid};
pub use sea::SeaGrid;
pub use tables::{ComputedGaussianTables, GaussianLayout, SamplingTable, SamplingTableSource};

/// Topology of a planetary grid and the lat/lon ⇄ bin index mapping.
///
/// Grids are immutable after construction and safe to share between threads.
pub trait PlanetaryGrid: Send + Sync + std::fmt::Debug {
    /// Bin containing (or nearest to) the given position.
    fn bin_index(&self, lat: f64, lon: f64) -> i64;

    /// Row the given bin belongs to.
    fn row_index(&self, bin_index: i64) -> Result<usize>;

    /// Total number of bins.
    fn num_bins(&self) -> i64;

    /// Number of rows, pole to pole.
    fn num_rows(&self) -> usize;

    /// Number of bins in `row`.
    fn num_cols(&self, row: usize) -> Result<usize>;

    /// Index of the first (westernmost) bin in `row`.
    fn first_bin_index(&self, row: usize) -> Result<i64>;

    /// Center latitude of `row` in degrees.
    fn center_lat(&self, row: usize) -> Result<f64>;

    /// Center (lat, lon) of the given bin in degrees.
    fn center_lat_lon(&self, bin_index: i64) -> Result<(f64, f64)>;
}

/// Grid implementations selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GridKind {
    /// SeaWiFS-style equal-area grid.
    #[default]
    Sea,
    /// Gaussian latitudes, `2 * num_rows` columns in every row.
    RegularGaussian,
    /// Gaussian latitudes, octahedral reduction of columns towards the poles.
    ReducedGaussian,
}

impl GridKind {
    /// Parse from string (case-insensitive). Unknown names yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sea" | "seagrid" => Some(Self::Sea),
            "regular_gaussian" | "regulargaussiangrid" => Some(Self::RegularGaussian),
            "reduced_gaussian" | "reducedgaussiangrid" => Some(Self::ReducedGaussian),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sea => "sea",
            Self::RegularGaussian => "regular_gaussian",
            Self::ReducedGaussian => "reduced_gaussian",
        }
    }

    /// Build a grid of this kind, loading gaussian tables from `tables`.
    pub fn create(
        &self,
        num_rows: usize,
        tables: &dyn SamplingTableSource,
    ) -> Result<Arc<dyn PlanetaryGrid>> {
        let grid: Arc<dyn PlanetaryGrid> = match self {
            Self::Sea => Arc::new(SeaGrid::new(num_rows)?),
            Self::RegularGaussian => Arc::new(RegularGaussianGrid::new(
                tables.load(GaussianLayout::Regular, num_rows)?,
            )?),
            Self::ReducedGaussian => Arc::new(ReducedGaussianGrid::new(
                tables.load(GaussianLayout::Reduced, num_rows)?,
            )?),
        };
        Ok(grid)
    }
}

impl std::fmt::Display for GridKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Index of the sample nearest to `target`.
///
/// Walks the table from the start while the distance to `target` does not
/// grow and returns the index just before the first increase, or the last
/// index if the distance never increases. This assumes distances fall and
/// then rise along the table, which holds for monotonic tables.
pub fn find_nearest(values: &[f64], target: f64) -> usize {
    let Some(first) = values.first() else {
        return 0;
    };
    let mut previous = (first - target).abs();
    for (i, value) in values.iter().enumerate().skip(1) {
        let distance = (value - target).abs();
        if distance > previous {
            return i - 1;
        }
        previous = distance;
    }
    values.len() - 1
}

pub(crate) fn check_row(row: usize, num_rows: usize) -> Result<()> {
    if row >= num_rows {
        return Err(BinningError::row_out_of_range(row as i64, num_rows as i64));
    }
    Ok(())
}

pub(crate) fn check_bin(index: i64, num_bins: i64) -> Result<()> {
    if index < 0 || index >= num_bins {
        return Err(BinningError::bin_out_of_range(index, num_bins));
    }
    Ok(())
}

/// Normalize a longitude into `[-180, 180)`.
pub(crate) fn normalize_lon(lon: f64) -> f64 {
    let mut lon = lon % 360.0;
    if lon >= 180.0 {
        lon -= 360.0;
    } else if lon < -180.0 {
        lon += 360.0;
    }
    lon
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_nearest_ascending() {
        let values = [0.0, 1.0, 2.0, 3.0, 4.0];
        assert_eq!(find_nearest(&values, -5.0), 0);
        assert_eq!(find_nearest(&values, 1.2), 1);
        assert_eq!(find_nearest(&values, 2.8), 3);
        assert_eq!(find_nearest(&values, 99.0), 4);
    }

    #[test]
    fn test_find_nearest_descending() {
        let values = [80.0, 40.0, 0.0, -40.0, -80.0];
        assert_eq!(find_nearest(&values, 85.0), 0);
        assert_eq!(find_nearest(&values, 30.0), 1);
        assert_eq!(find_nearest(&values, -61.0), 4);
    }

    #[test]
    fn test_find_nearest_irregular_spacing() {
        let values = [0.0, 0.5, 3.0, 3.2, 10.0];
        assert_eq!(find_nearest(&values, 1.5), 1);
        assert_eq!(find_nearest(&values, 2.0), 2);
        assert_eq!(find_nearest(&values, 7.0), 4);
    }

    #[test]
    fn test_find_nearest_tie_moves_on() {
        // Equal distances do not stop the walk.
        let values = [0.0, 2.0, 4.0];
        assert_eq!(find_nearest(&values, 1.0), 1);
    }

    #[test]
    fn test_find_nearest_empty() {
        assert_eq!(find_nearest(&[], 1.0), 0);
    }

    #[test]
    fn test_grid_kind_parse() {
        assert_eq!(GridKind::parse("SEA"), Some(GridKind::Sea));
        assert_eq!(GridKind::parse("regular_gaussian"), Some(GridKind::RegularGaussian));
        assert_eq!(GridKind::parse("ReducedGaussianGrid"), Some(GridKind::ReducedGaussian));
        assert_eq!(GridKind::parse("mercator"), None);
    }

    #[test]
    fn test_normalize_lon() {
        assert_eq!(normalize_lon(190.0), -170.0);
        assert_eq!(normalize_lon(-190.0), 170.0);
        assert_eq!(normalize_lon(180.0), -180.0);
        assert_eq!(normalize_lon(45.0), 45.0);
    }
}
