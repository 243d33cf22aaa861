//! Bounding-box grid planning.
//!
//! Tiles a lat/lon bounding box into overlapping radius-search cells sized by
//! the box's extent. Longitude step adjusts for latitude curvature so physical
//! spacing stays ~equal (equirectangular approximation; degrades near poles).

const KM_PER_LAT_DEGREE: f64 = 111.0;

/// Rectangular region in latitude/longitude degrees.
///
/// The caller is responsible for min ≤ max on each axis; the planner does not
/// auto-correct an inverted box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Largest per-axis span in degrees.
    #[must_use]
    pub fn extent_deg(&self) -> f64 {
        let lat_diff = (self.max_lat - self.min_lat).abs();
        let lon_diff = (self.max_lon - self.min_lon).abs();
        lat_diff.max(lon_diff)
    }

    /// True when either axis spans more than `limit_deg` degrees.
    #[must_use]
    pub fn wider_than(&self, limit_deg: f64) -> bool {
        (self.max_lat - self.min_lat).abs() > limit_deg
            || (self.max_lon - self.min_lon).abs() > limit_deg
    }
}

/// One radius-search sub-query: a center point and a search radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    pub lat: f64,
    pub lon: f64,
    pub radius_m: u32,
}

/// Step size and search radius for one bounding-box size class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchTier {
    pub step_km: f64,
    pub radius_m: u32,
}

/// Select the search tier for a bounding box of the given extent.
///
/// Smaller areas get finer coverage with tighter circles; past 2° the step
/// grows proportionally to the extent so the cell count stays bounded while
/// the 50 km radius avoids coverage gaps.
#[must_use]
pub fn tier_for_extent(extent_deg: f64) -> SearchTier {
    if extent_deg < 0.1 {
        SearchTier {
            step_km: 3.0,
            radius_m: 5_000,
        }
    } else if extent_deg < 0.5 {
        SearchTier {
            step_km: 10.0,
            radius_m: 15_000,
        }
    } else if extent_deg < 2.0 {
        SearchTier {
            step_km: 25.0,
            radius_m: 35_000,
        }
    } else {
        SearchTier {
            step_km: (extent_deg * KM_PER_LAT_DEGREE / 8.0).max(30.0),
            radius_m: 50_000,
        }
    }
}

/// Lay out search-circle centers on a regular lattice covering the box.
///
/// Centers start at min + half-step on each axis and advance by the full step
/// until one extra step past max; the overshoot is intentional so the box's
/// edges stay inside some circle. Returns cells in row-major generation order,
/// which is deterministic but carries no downstream meaning.
///
/// A zero-size box yields a single cell. No upper bound is imposed on the cell
/// count here; the caller guards against pathologically large boxes.
#[must_use]
pub fn plan(bbox: &BoundingBox) -> Vec<GridCell> {
    let tier = tier_for_extent(bbox.extent_deg());

    let avg_lat = (bbox.min_lat + bbox.max_lat) / 2.0;
    let step_lat = tier.step_km / KM_PER_LAT_DEGREE;
    let step_lon = tier.step_km / (KM_PER_LAT_DEGREE * avg_lat.to_radians().cos());

    let mut cells = Vec::new();
    let mut lat = bbox.min_lat + step_lat / 2.0;
    while lat < bbox.max_lat + step_lat {
        let mut lon = bbox.min_lon + step_lon / 2.0;
        while lon < bbox.max_lon + step_lon {
            cells.push(GridCell {
                lat,
                lon,
                radius_m: tier.radius_m,
            });
            lon += step_lon;
        }
        lat += step_lat;
    }
    cells
}
