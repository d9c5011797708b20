//! Common test fixtures for binning tests.
//!
//! This module provides pre-defined regions, times and configuration
//! documents that represent common binning scenarios.

use std::io::Write;
use tempfile::NamedTempFile;

/// Common bounding box definitions as `(min_lon, min_lat, max_lon, max_lat)`.
pub mod bbox {
    /// Global bounding box (-180 to 180, -90 to 90)
    pub const GLOBAL: (f64, f64, f64, f64) = (-180.0, -90.0, 180.0, 90.0);

    /// Europe bounding box
    pub const EUROPE: (f64, f64, f64, f64) = (-15.0, 35.0, 45.0, 72.0);

    /// West African coast, a typical ocean colour test area
    pub const MAURITANIA: (f64, f64, f64, f64) = (-20.0, 15.0, -15.0, 22.0);

    /// A small 1 x 1 degree box
    pub const SMALL: (f64, f64, f64, f64) = (10.0, 40.0, 11.0, 41.0);

    /// Invalid bbox (min > max)
    pub const INVALID: (f64, f64, f64, f64) = (10.0, 10.0, 5.0, 5.0);
}

/// Common time values for testing, as modified Julian dates.
pub mod time {
    /// 2024-01-15T00:00:00Z
    pub const REFERENCE_MJD: f64 = 60324.0;

    /// 2000-01-01T00:00:00Z
    pub const MJD_2000: f64 = 51544.0;

    /// One hour in days
    pub const HOUR: f64 = 1.0 / 24.0;
}

/// Common binning configuration documents.
pub mod configs {
    /// Smallest valid config: one variable, one aggregator, defaults
    /// elsewhere.
    pub const MINIMAL_YAML: &str = r#"
variables: [chl]
aggregators:
  - type: AVG
    var_name: chl
"#;

    /// Maximum NDVI composite on a regular gaussian grid.
    pub const NDVI_MAX_YAML: &str = r#"
planetary_grid: regular_gaussian
num_rows: 64
variables: [ndvi, mask, pass]
aggregators:
  - type: ON_MAX_SET_WITH_MASK
    on_max_var_name: ndvi
    mask_var_name: mask
    set_var_names: [pass]
"#;

    /// Every aggregator type, a data period and a region.
    pub const FULL_YAML: &str = r#"
planetary_grid: sea
num_rows: 180
compositing_type: binning
super_sampling: 2
variables: [ndvi, mask, pass]
aggregators:
  - type: AVG
    var_name: ndvi
    weight_coeff: 0.5
    output_counts: true
  - type: MIN_MAX
    var_name: ndvi
    target_name: ndvi_range
  - type: ON_MAX_SET
    on_max_var_name: ndvi
    target_name: ndvi_peak
    set_var_names: [pass]
  - type: ON_MAX_SET_WITH_MASK
    on_max_var_name: ndvi
    mask_var_name: mask
    target_name: ndvi_clear
  - type: PERCENTILE
    var_name: ndvi
    percentage: 50
data_period:
  type: temporal
  start_mjd: 60324.0
  duration_days: 8.0
region:
  type: polygon
  vertices: [[-20.0, 10.0], [20.0, 10.0], [20.0, 40.0], [-20.0, 40.0]]
"#;
}

/// Writes `content` to a fresh temporary file. The file is removed when the
/// returned handle is dropped.
pub fn write_temp_config(content: &str) -> std::io::Result<NamedTempFile> {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile()?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_ordering() {
        for (min_lon, min_lat, max_lon, max_lat) in
            [bbox::GLOBAL, bbox::EUROPE, bbox::MAURITANIA, bbox::SMALL]
        {
            assert!(min_lon < max_lon);
            assert!(min_lat < max_lat);
        }
        let (min_lon, _, max_lon, _) = bbox::INVALID;
        assert!(min_lon > max_lon);
    }

    #[test]
    fn test_write_temp_config() {
        let file = write_temp_config(configs::MINIMAL_YAML).unwrap();
        let content = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(content, configs::MINIMAL_YAML);
        assert!(file.path().extension().is_some_and(|e| e == "yaml"));
    }
}
