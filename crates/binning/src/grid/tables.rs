//! Sampling tables for gaussian grids.
//!
//! A table holds the center latitude of every row (north to south) and the
//! longitude sample points of every row (ascending, in `[0, 360)`). Tables are
//! loaded once, when a grid is built, and never change afterwards.

use crate::error::{BinningError, Result};
use std::f64::consts::PI;

/// Column layout of a gaussian grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaussianLayout {
    /// `2 * num_rows` columns in every row.
    Regular,
    /// Octahedral reduction: `4 * i + 16` columns in the `i`-th row from the
    /// nearer pole (1-based).
    Reduced,
}

/// Row latitudes and per-row longitude samples of a gaussian grid.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingTable {
    pub latitudes: Vec<f64>,
    pub longitudes: Vec<Vec<f64>>,
}

impl SamplingTable {
    pub fn num_rows(&self) -> usize {
        self.latitudes.len()
    }

    /// Check the shape of the table.
    pub fn validate(&self) -> Result<()> {
        if self.latitudes.len() < 2 {
            return Err(BinningError::invalid_table(format!(
                "expected at least 2 rows, got {}",
                self.latitudes.len()
            )));
        }
        if self.latitudes.len() != self.longitudes.len() {
            return Err(BinningError::invalid_table(format!(
                "{} latitudes but {} longitude rows",
                self.latitudes.len(),
                self.longitudes.len()
            )));
        }
        if self.latitudes.windows(2).any(|w| w[0] <= w[1]) {
            return Err(BinningError::invalid_table(
                "latitudes must be strictly decreasing",
            ));
        }
        for (row, lons) in self.longitudes.iter().enumerate() {
            if lons.is_empty() {
                return Err(BinningError::invalid_table(format!("row {row} has no columns")));
            }
            if lons.windows(2).any(|w| w[0] >= w[1]) {
                return Err(BinningError::invalid_table(format!(
                    "longitudes of row {row} must be strictly increasing"
                )));
            }
        }
        Ok(())
    }
}

/// Supplier of gaussian sampling tables.
pub trait SamplingTableSource: Send + Sync {
    fn load(&self, layout: GaussianLayout, num_rows: usize) -> Result<SamplingTable>;
}

/// Derives tables from first principles: latitudes are the roots of the
/// Legendre polynomial of degree `num_rows`, longitudes are equally spaced.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComputedGaussianTables;

impl SamplingTableSource for ComputedGaussianTables {
    fn load(&self, layout: GaussianLayout, num_rows: usize) -> Result<SamplingTable> {
        if num_rows < 4 || num_rows % 2 != 0 {
            return Err(BinningError::config(format!(
                "gaussian grids need an even number of rows >= 4, got {num_rows}"
            )));
        }

        let latitudes = gaussian_latitudes(num_rows);
        let longitudes = (0..num_rows)
            .map(|row| equally_spaced_longitudes(columns_for_row(layout, num_rows, row)))
            .collect();

        let table = SamplingTable {
            latitudes,
            longitudes,
        };
        table.validate()?;
        Ok(table)
    }
}

fn columns_for_row(layout: GaussianLayout, num_rows: usize, row: usize) -> usize {
    match layout {
        GaussianLayout::Regular => 2 * num_rows,
        GaussianLayout::Reduced => {
            let from_pole = if row < num_rows / 2 {
                row + 1
            } else {
                num_rows - row
            };
            4 * from_pole + 16
        }
    }
}

fn equally_spaced_longitudes(num_cols: usize) -> Vec<f64> {
    let step = 360.0 / num_cols as f64;
    (0..num_cols).map(|col| col as f64 * step).collect()
}

/// Gaussian latitudes in degrees, north to south.
pub fn gaussian_latitudes(num_rows: usize) -> Vec<f64> {
    let n = num_rows;
    let mut latitudes = vec![0.0; n];
    for i in 0..n / 2 {
        // Initial guess for the i-th root, refined by Newton iteration.
        let mut x = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
        for _ in 0..100 {
            let (p, dp) = legendre(n, x);
            let dx = p / dp;
            x -= dx;
            if dx.abs() < 1e-15 {
                break;
            }
        }
        let lat = x.asin().to_degrees();
        latitudes[i] = lat;
        latitudes[n - 1 - i] = -lat;
    }
    latitudes
}

/// Legendre polynomial `P_n(x)` and its derivative.
fn legendre(n: usize, x: f64) -> (f64, f64) {
    let mut p0 = 1.0;
    let mut p1 = x;
    for k in 2..=n {
        let k = k as f64;
        let p2 = ((2.0 * k - 1.0) * x * p1 - (k - 1.0) * p0) / k;
        p0 = p1;
        p1 = p2;
    }
    let dp = n as f64 * (x * p1 - p0) / (x * x - 1.0);
    (p1, dp)
}
