//! Geographic regions used to restrict which observations are binned.

use serde::{Deserialize, Serialize};

/// A geographic bounding box in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// The whole globe.
    pub fn global() -> Self {
        Self::new(-180.0, -90.0, 180.0, 90.0)
    }

    /// Check if a point is contained within this bounding box.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }

    pub fn is_valid(&self) -> bool {
        self.min_lon <= self.max_lon && self.min_lat <= self.max_lat
    }
}

/// Region of interest of a binning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Region {
    BoundingBox(BoundingBox),
    /// Simple polygon given as `[lon, lat]` vertices; the ring is closed
    /// implicitly.
    Polygon { vertices: Vec<[f64; 2]> },
}

impl Region {
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        match self {
            Self::BoundingBox(bbox) => bbox.contains(lon, lat),
            Self::Polygon { vertices } => polygon_contains(vertices, lon, lat),
        }
    }

    /// Bounding box of the region.
    pub fn bounds(&self) -> BoundingBox {
        match self {
            Self::BoundingBox(bbox) => *bbox,
            Self::Polygon { vertices } => {
                let mut bbox = BoundingBox::new(f64::MAX, f64::MAX, f64::MIN, f64::MIN);
                for &[lon, lat] in vertices {
                    bbox.min_lon = bbox.min_lon.min(lon);
                    bbox.max_lon = bbox.max_lon.max(lon);
                    bbox.min_lat = bbox.min_lat.min(lat);
                    bbox.max_lat = bbox.max_lat.max(lat);
                }
                bbox
            }
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::BoundingBox(bbox) if !bbox.is_valid() => {
                Err(format!("invalid region bounding box {bbox:?}"))
            }
            Self::Polygon { vertices } if vertices.len() < 3 => Err(format!(
                "region polygon needs at least 3 vertices, got {}",
                vertices.len()
            )),
            _ => Ok(()),
        }
    }
}

/// Even-odd ray casting.
fn polygon_contains(vertices: &[[f64; 2]], x: f64, y: f64) -> bool {
    let mut inside = false;
    let n = vertices.len();
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let [xi, yi] = vertices[i];
        let [xj, yj] = vertices[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}
