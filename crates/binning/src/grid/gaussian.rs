//! Gaussian grids.
//!
//! Gaussian latitudes are not equally spaced, so a latitude cannot be turned
//! into a row by division. Both grids locate the row by a nearest-point search
//! over the row latitude table and then the column by the same search over
//! that row's longitude samples. Reported centers are the table values.

use super::tables::SamplingTable;
use super::{check_bin, check_row, find_nearest, normalize_lon, PlanetaryGrid};
use crate::error::{BinningError, Result};

/// Longitudes in the tables are in `[0, 360)`.
fn table_lon(lon: f64) -> f64 {
    let lon = normalize_lon(lon);
    if lon < 0.0 {
        lon + 360.0
    } else {
        lon
    }
}

/// The column search does not wrap around the 0/360 seam: a longitude just
/// west of 0 goes to the last column of the row, even when column 0 is
/// closer.
fn nearest_row_col(table: &SamplingTable, lat: f64, lon: f64) -> (usize, usize) {
    let row = find_nearest(&table.latitudes, lat);
    let col = find_nearest(&table.longitudes[row], table_lon(lon));
    (row, col)
}

/// Gaussian grid with the same number of columns in every row.
#[derive(Debug, Clone)]
pub struct RegularGaussianGrid {
    table: SamplingTable,
    num_cols: usize,
}

impl RegularGaussianGrid {
    pub fn new(table: SamplingTable) -> Result<Self> {
        table.validate()?;
        let num_cols = table.longitudes[0].len();
        if table.longitudes.iter().any(|row| row.len() != num_cols) {
            return Err(BinningError::invalid_table(
                "regular gaussian grid needs the same column count in every row",
            ));
        }
        Ok(Self { table, num_cols })
    }
}

impl PlanetaryGrid for RegularGaussianGrid {
    /// Nearest tabulated row, then nearest column of that row. Longitudes
    /// just west of 0 map to the last column (no wrap at the seam).
    fn bin_index(&self, lat: f64, lon: f64) -> i64 {
        let (row, col) = nearest_row_col(&self.table, lat, lon);
        (row * self.num_cols + col) as i64
    }

    fn row_index(&self, bin_index: i64) -> Result<usize> {
        check_bin(bin_index, self.num_bins())?;
        Ok(bin_index as usize / self.num_cols)
    }

    fn num_bins(&self) -> i64 {
        (self.table.num_rows() * self.num_cols) as i64
    }

    fn num_rows(&self) -> usize {
        self.table.num_rows()
    }

    fn num_cols(&self, row: usize) -> Result<usize> {
        check_row(row, self.num_rows())?;
        Ok(self.num_cols)
    }

    fn first_bin_index(&self, row: usize) -> Result<i64> {
        check_row(row, self.num_rows())?;
        Ok((row * self.num_cols) as i64)
    }

    fn center_lat(&self, row: usize) -> Result<f64> {
        check_row(row, self.num_rows())?;
        Ok(self.table.latitudes[row])
    }

    fn center_lat_lon(&self, bin_index: i64) -> Result<(f64, f64)> {
        let row = self.row_index(bin_index)?;
        let col = bin_index as usize - row * self.num_cols;
        Ok((
            self.table.latitudes[row],
            normalize_lon(self.table.longitudes[row][col]),
        ))
    }
}

/// Gaussian grid whose rows get fewer columns towards the poles.
#[derive(Debug, Clone)]
pub struct ReducedGaussianGrid {
    table: SamplingTable,
    first_bin: Vec<i64>,
    num_bins: i64,
}

impl ReducedGaussianGrid {
    pub fn new(table: SamplingTable) -> Result<Self> {
        table.validate()?;
        let mut first_bin = Vec::with_capacity(table.num_rows());
        let mut next = 0i64;
        for lons in &table.longitudes {
            first_bin.push(next);
            next += lons.len() as i64;
        }
        Ok(Self {
            table,
            first_bin,
            num_bins: next,
        })
    }
}

impl PlanetaryGrid for ReducedGaussianGrid {
    fn bin_index(&self, lat: f64, lon: f64) -> i64 {
        let (row, col) = nearest_row_col(&self.table, lat, lon);
        self.first_bin[row] + col as i64
    }

    fn row_index(&self, bin_index: i64) -> Result<usize> {
        check_bin(bin_index, self.num_bins)?;
        Ok(self.first_bin.partition_point(|&first| first <= bin_index) - 1)
    }

    fn num_bins(&self) -> i64 {
        self.num_bins
    }

    fn num_rows(&self) -> usize {
        self.table.num_rows()
    }

    fn num_cols(&self, row: usize) -> Result<usize> {
        check_row(row, self.num_rows())?;
        Ok(self.table.longitudes[row].len())
    }

    fn first_bin_index(&self, row: usize) -> Result<i64> {
        check_row(row, self.num_rows())?;
        Ok(self.first_bin[row])
    }

    fn center_lat(&self, row: usize) -> Result<f64> {
        check_row(row, self.num_rows())?;
        Ok(self.table.latitudes[row])
    }

    fn center_lat_lon(&self, bin_index: i64) -> Result<(f64, f64)> {
        let row = self.row_index(bin_index)?;
        let col = (bin_index - self.first_bin[row]) as usize;
        Ok((
            self.table.latitudes[row],
            normalize_lon(self.table.longitudes[row][col]),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::tables::{ComputedGaussianTables, GaussianLayout, SamplingTableSource};

    fn regular(num_rows: usize) -> RegularGaussianGrid {
        let table = ComputedGaussianTables
            .load(GaussianLayout::Regular, num_rows)
            .unwrap();
        RegularGaussianGrid::new(table).unwrap()
    }

    #[test]
    fn test_regular_dimensions() {
        let grid = regular(64);
        assert_eq!(grid.num_rows(), 64);
        assert_eq!(grid.num_cols(0).unwrap(), 128);
        assert_eq!(grid.num_cols(63).unwrap(), 128);
        assert_eq!(grid.num_bins(), 64 * 128);
        assert_eq!(grid.first_bin_index(3).unwrap(), 384);
        assert_eq!(grid.row_index(385).unwrap(), 3);
    }

    #[test]
    fn test_regular_lookup_uses_nearest_table_point() {
        let grid = regular(64);
        let lat = grid.center_lat(10).unwrap();
        // slightly off the tabulated latitude, still nearest to row 10
        let bin = grid.bin_index(lat + 0.1, 2.9);
        assert_eq!(grid.row_index(bin).unwrap(), 10);
        // 2.9 degrees is nearest to the column at 2.8125
        assert_eq!(bin, 10 * 128 + 1);
    }

    #[test]
    fn test_regular_negative_longitude() {
        let grid = regular(64);
        let bin = grid.bin_index(0.5, -2.8125);
        let (_, lon) = grid.center_lat_lon(bin).unwrap();
        assert!((lon + 2.8125).abs() < 1e-9);
    }

    #[test]
    fn test_regular_lookup_does_not_wrap_at_seam() {
        let grid = regular(64);
        let bin = grid.bin_index(0.5, -0.1);
        let row = grid.row_index(bin).unwrap();
        assert_eq!(bin, grid.first_bin_index(row).unwrap() + 127);
        let (_, lon) = grid.center_lat_lon(bin).unwrap();
        assert!((lon + 2.8125).abs() < 1e-9);
    }

    #[test]
    fn test_regular_row_out_of_range() {
        let grid = regular(64);
        let err = grid.center_lat(64).unwrap_err();
        assert!(matches!(err, BinningError::RowOutOfRange { row: 64, max: 63 }));
        assert!(grid.num_cols(100).is_err());
        assert!(grid.first_bin_index(64).is_err());
    }

    #[test]
    fn test_center_round_trips_to_same_bin() {
        let grid = regular(128);
        for bin in [0, 1, 255, 256, 1000, grid.num_bins() - 1] {
            let (lat, lon) = grid.center_lat_lon(bin).unwrap();
            assert_eq!(grid.bin_index(lat, lon), bin);
        }
    }

    #[test]
    fn test_reduced_layout() {
        let table = ComputedGaussianTables
            .load(GaussianLayout::Reduced, 8)
            .unwrap();
        let grid = ReducedGaussianGrid::new(table).unwrap();
        assert_eq!(grid.num_bins(), 2 * (20 + 24 + 28 + 32));
        assert_eq!(grid.first_bin_index(1).unwrap(), 20);
        assert_eq!(grid.row_index(20).unwrap(), 1);
        assert_eq!(grid.row_index(19).unwrap(), 0);
        for bin in [0, 19, 20, 100, grid.num_bins() - 1] {
            let (lat, lon) = grid.center_lat_lon(bin).unwrap();
            assert_eq!(grid.bin_index(lat, lon), bin);
        }
    }

    #[test]
    fn test_regular_rejects_ragged_table() {
        let table = ComputedGaussianTables
            .load(GaussianLayout::Reduced, 8)
            .unwrap();
        assert!(RegularGaussianGrid::new(table).is_err());
    }
}
