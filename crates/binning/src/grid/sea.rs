//! The SeaWiFS equal-area grid.

use super::{check_bin, check_row, normalize_lon, PlanetaryGrid};
use crate::error::{BinningError, Result};

/// Equal-area grid with rows of constant latitude height and a column count
/// proportional to the cosine of the row's center latitude.
#[derive(Debug, Clone)]
pub struct SeaGrid {
    num_rows: usize,
    lat_bin: Vec<f64>,
    base_bin: Vec<i64>,
    num_bin: Vec<usize>,
    num_bins: i64,
}

impl SeaGrid {
    /// Default number of rows (~9.28 km bins).
    pub const DEFAULT_NUM_ROWS: usize = 2160;

    pub fn new(num_rows: usize) -> Result<Self> {
        if num_rows <= 2 {
            return Err(BinningError::config(format!(
                "number of rows must be greater than 2, got {num_rows}"
            )));
        }

        let mut lat_bin = Vec::with_capacity(num_rows);
        let mut base_bin = Vec::with_capacity(num_rows);
        let mut num_bin = Vec::with_capacity(num_rows);
        let mut next_base = 0i64;

        for row in 0..num_rows {
            let lat = 90.0 - (row as f64 + 0.5) * 180.0 / num_rows as f64;
            let cols = (0.5 + 2.0 * num_rows as f64 * lat.to_radians().cos()) as usize;
            let cols = cols.max(1);
            lat_bin.push(lat);
            base_bin.push(next_base);
            num_bin.push(cols);
            next_base += cols as i64;
        }

        Ok(Self {
            num_rows,
            lat_bin,
            base_bin,
            num_bin,
            num_bins: next_base,
        })
    }

    fn row_for_lat(&self, lat: f64) -> usize {
        let row = ((90.0 - lat) * self.num_rows as f64 / 180.0).floor();
        row.clamp(0.0, (self.num_rows - 1) as f64) as usize
    }
}

impl PlanetaryGrid for SeaGrid {
    fn bin_index(&self, lat: f64, lon: f64) -> i64 {
        let row = self.row_for_lat(lat);
        let cols = self.num_bin[row];
        let col = ((normalize_lon(lon) + 180.0) / 360.0 * cols as f64).floor();
        let col = col.clamp(0.0, (cols - 1) as f64) as i64;
        self.base_bin[row] + col
    }

    fn row_index(&self, bin_index: i64) -> Result<usize> {
        check_bin(bin_index, self.num_bins)?;
        Ok(self.base_bin.partition_point(|&base| base <= bin_index) - 1)
    }

    fn num_bins(&self) -> i64 {
        self.num_bins
    }

    fn num_rows(&self) -> usize {
        self.num_rows
    }

    fn num_cols(&self, row: usize) -> Result<usize> {
        check_row(row, self.num_rows)?;
        Ok(self.num_bin[row])
    }

    fn first_bin_index(&self, row: usize) -> Result<i64> {
        check_row(row, self.num_rows)?;
        Ok(self.base_bin[row])
    }

    fn center_lat(&self, row: usize) -> Result<f64> {
        check_row(row, self.num_rows)?;
        Ok(self.lat_bin[row])
    }

    fn center_lat_lon(&self, bin_index: i64) -> Result<(f64, f64)> {
        let row = self.row_index(bin_index)?;
        let col = (bin_index - self.base_bin[row]) as f64;
        let lon = -180.0 + (col + 0.5) * 360.0 / self.num_bin[row] as f64;
        Ok((self.lat_bin[row], lon))
    }
}
