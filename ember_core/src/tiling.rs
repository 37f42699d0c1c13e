//! The "SPACE" half of the presence pipeline - coarse square-grid tiling.
//!
//! Maps a raw coordinate to a grid cell identifier using a local
//! equirectangular approximation. Tiles exist purely for *equality*: the
//! reporter compares and emits them, it never measures distances between
//! them, so no floating-point drift tolerance is needed - determinism is the
//! only contract.

use crate::error::CoreError;
use ember_env::Coordinate;
use serde::{Deserialize, Serialize};

/// Meters per degree of latitude (spherical approximation).
pub const METERS_PER_DEGREE_LAT: f64 = 111_000.0;

/// Latitude magnitude beyond which the longitude convergence factor is
/// frozen, so cells near the poles stay finite.
const MAX_CONVERGENCE_LAT_DEG: f64 = 89.9;

/// A coarse grid cell identifier: integer pair plus resolution.
///
/// Equality and the stable string form (`"<res>:<x>:<y>"`) are invariant
/// under the same resolution. Created on demand, never mutated, never
/// persisted by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileId {
    /// Grid column (floor of scaled longitude)
    pub x: i64,

    /// Grid row (floor of scaled latitude)
    pub y: i64,

    /// Resolution: meters per cell edge
    pub meters_per_tile: u32,
}

impl std::fmt::Display for TileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.meters_per_tile, self.x, self.y)
    }
}

/// Deterministic coordinate -> tile mapping at a fixed resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpatialTiler {
    meters_per_tile: u32,
}

impl SpatialTiler {
    /// Creates a tiler at the given resolution (meters per cell edge).
    pub fn new(meters_per_tile: u32) -> Result<Self, CoreError> {
        if meters_per_tile == 0 {
            return Err(CoreError::NonPositiveTileResolution(meters_per_tile));
        }
        Ok(Self { meters_per_tile })
    }

    /// Returns the tiler's resolution in meters per cell edge.
    pub fn meters_per_tile(&self) -> u32 {
        self.meters_per_tile
    }

    /// Maps a coordinate to its grid cell.
    ///
    /// Coordinates outside [-90, 90] x [-180, 180] are clamped into range
    /// before tiling (documented choice; such input is undefined upstream).
    ///
    /// The cell width in degrees of longitude grows with `1/cos(lat)` to
    /// correct for meridian convergence, so cells stay roughly square in
    /// meters everywhere except the immediate poles.
    pub fn tile_for(&self, coord: &Coordinate) -> TileId {
        let lat = coord.lat_deg.clamp(-90.0, 90.0);
        let lon = coord.lon_deg.clamp(-180.0, 180.0);

        let d_lat = self.meters_per_tile as f64 / METERS_PER_DEGREE_LAT;
        let convergence_lat = lat.clamp(-MAX_CONVERGENCE_LAT_DEG, MAX_CONVERGENCE_LAT_DEG);
        let d_lon = d_lat / convergence_lat.to_radians().cos();

        TileId {
            x: ((lon + 180.0) / d_lon).floor() as i64,
            y: ((lat + 90.0) / d_lat).floor() as i64,
            meters_per_tile: self.meters_per_tile,
        }
    }
}

/// Approximate ground distance between two coordinates, in meters.
///
/// Equirectangular approximation: exact enough for the gate's hysteresis
/// radii (hundreds of meters), cheap enough to run on every location fix.
pub fn distance_meters(a: &Coordinate, b: &Coordinate) -> f64 {
    let mid_lat = ((a.lat_deg + b.lat_deg) / 2.0).to_radians();
    let dy = (b.lat_deg - a.lat_deg) * METERS_PER_DEGREE_LAT;
    let dx = (b.lon_deg - a.lon_deg) * METERS_PER_DEGREE_LAT * mid_lat.cos();
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SF: Coordinate = Coordinate {
        lat_deg: 37.7749,
        lon_deg: -122.4194,
    };

    #[test]
    fn test_same_cell_same_tile() {
        let tiler = SpatialTiler::new(250).unwrap();
        let base = tiler.tile_for(&SF);

        // Points a few meters apart land in the same 250m cell
        // (5m of latitude is ~0.000045 degrees)
        let nearby = Coordinate::new(SF.lat_deg + 0.000045, SF.lon_deg + 0.000045);
        assert_eq!(tiler.tile_for(&nearby), base);
    }

    #[test]
    fn test_cell_boundary_changes_one_axis() {
        let tiler = SpatialTiler::new(250).unwrap();
        let base = tiler.tile_for(&SF);

        // Step a full cell north: y changes, x does not
        let d_lat = 250.0 / METERS_PER_DEGREE_LAT;
        let north = Coordinate::new(SF.lat_deg + d_lat, SF.lon_deg);
        let north_tile = tiler.tile_for(&north);
        assert_eq!(north_tile.x, base.x);
        assert_eq!(north_tile.y, base.y + 1);
    }

    #[test]
    fn test_determinism() {
        let tiler = SpatialTiler::new(100).unwrap();
        assert_eq!(tiler.tile_for(&SF), tiler.tile_for(&SF));
    }

    #[test]
    fn test_stable_string_form() {
        let tiler = SpatialTiler::new(250).unwrap();
        let tile = tiler.tile_for(&SF);
        let formatted = tile.to_string();
        assert!(formatted.starts_with("250:"));
        assert_eq!(formatted, format!("250:{}:{}", tile.x, tile.y));
    }

    #[test]
    fn test_out_of_range_clamped() {
        let tiler = SpatialTiler::new(250).unwrap();
        let over = Coordinate::new(95.0, 200.0);
        let edge = Coordinate::new(90.0, 180.0);
        assert_eq!(tiler.tile_for(&over), tiler.tile_for(&edge));
    }

    #[test]
    fn test_polar_cell_finite() {
        let tiler = SpatialTiler::new(250).unwrap();
        let pole = Coordinate::new(90.0, 0.0);
        let tile = tiler.tile_for(&pole);
        assert!(tile.x.abs() < i64::MAX / 2);
    }

    #[test]
    fn test_zero_resolution_rejected() {
        assert_eq!(
            SpatialTiler::new(0),
            Err(CoreError::NonPositiveTileResolution(0))
        );
    }

    #[test]
    fn test_distance_pure_latitude() {
        // One degree of latitude is ~111km by construction
        let a = Coordinate::new(37.0, -122.0);
        let b = Coordinate::new(38.0, -122.0);
        assert_relative_eq!(distance_meters(&a, &b), METERS_PER_DEGREE_LAT, epsilon = 1.0);
    }

    #[test]
    fn test_distance_symmetric() {
        let a = Coordinate::new(37.7749, -122.4194);
        let b = Coordinate::new(37.7800, -122.4100);
        assert_relative_eq!(
            distance_meters(&a, &b),
            distance_meters(&b, &a),
            epsilon = 1e-9
        );
    }
}
