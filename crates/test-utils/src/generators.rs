//! Synthetic observation generators.
//!
//! These generators create predictable, verifiable observation patterns that
//! can be fed to the binner across the test suite. They return plain
//! [`SyntheticObservation`] records so this crate stays free of a dependency
//! on the binning crate itself.

/// One generated observation.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticObservation {
    pub lat: f64,
    pub lon: f64,
    pub mjd: f64,
    pub values: Vec<f32>,
}

/// Regular sample positions covering a bounding box.
///
/// Samples sit at the centres of `step`-sized cells of the box, row by row
/// from the northern edge, so no sample falls on the box edge itself.
///
/// # Arguments
///
/// * `bbox` - `(min_lon, min_lat, max_lon, max_lat)`
/// * `step` - Sample spacing in degrees
///
/// # Example
///
/// ```
/// use test_utils::sample_positions;
///
/// let positions = sample_positions((0.0, 0.0, 2.0, 1.0), 1.0);
/// assert_eq!(positions, vec![(0.5, 0.5), (0.5, 1.5)]);
/// ```
pub fn sample_positions(bbox: (f64, f64, f64, f64), step: f64) -> Vec<(f64, f64)> {
    let (min_lon, min_lat, max_lon, max_lat) = bbox;
    let rows = ((max_lat - min_lat) / step).round().max(0.0) as usize;
    let cols = ((max_lon - min_lon) / step).round().max(0.0) as usize;
    let mut positions = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        let lat = max_lat - (row as f64 + 0.5) * step;
        for col in 0..cols {
            let lon = min_lon + (col as f64 + 0.5) * step;
            positions.push((lat, lon));
        }
    }
    positions
}

/// Creates one pass of observations over `bbox` whose single value is a
/// chlorophyll-like gradient: `1 + (lat + 90) / 18`, i.e. 1 at the south pole
/// and 11 at the north pole.
pub fn create_chlorophyll_pass(
    bbox: (f64, f64, f64, f64),
    step: f64,
    mjd: f64,
) -> Vec<SyntheticObservation> {
    sample_positions(bbox, step)
        .into_iter()
        .map(|(lat, lon)| SyntheticObservation {
            lat,
            lon,
            mjd,
            values: vec![(1.0 + (lat + 90.0) / 18.0) as f32],
        })
        .collect()
}

/// Creates one pass of NDVI-like observations with values
/// `[ndvi, mask, pass_number]`.
///
/// NDVI lies in `[0, 1)`, derived deterministically from `seed` and the
/// sample position. Roughly one sample in four is cloudy (mask 0). Samples
/// are spread over the pass: sample `i` is taken at `mjd + i * 1e-5`.
pub fn create_ndvi_pass(
    bbox: (f64, f64, f64, f64),
    step: f64,
    mjd: f64,
    pass_number: u32,
    seed: u32,
) -> Vec<SyntheticObservation> {
    sample_positions(bbox, step)
        .into_iter()
        .enumerate()
        .map(|(i, (lat, lon))| {
            let hash = simple_hash(i as u32, pass_number, seed);
            let ndvi = (hash % 10_000) as f32 / 10_000.0;
            let mask = if hash % 4 == 0 { 0.0 } else { 1.0 };
            SyntheticObservation {
                lat,
                lon,
                mjd: mjd + i as f64 * 1e-5,
                values: vec![ndvi, mask, pass_number as f32],
            }
        })
        .collect()
}

/// Copies `observations`, replacing value `variable` with NaN at the given
/// sample indices.
pub fn with_nan_values(
    observations: &[SyntheticObservation],
    variable: usize,
    indices: &[usize],
) -> Vec<SyntheticObservation> {
    let mut result = observations.to_vec();
    for &i in indices {
        if let Some(value) = result.get_mut(i).and_then(|o| o.values.get_mut(variable)) {
            *value = f32::NAN;
        }
    }
    result
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}
