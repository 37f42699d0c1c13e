//! Common types for the Ember environment abstraction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A geographic coordinate in degrees (WGS84 latitude/longitude).
///
/// The shared coordinate domain for the tiler, the presence gate, and the
/// heat compositor. Altitude is deliberately absent; the pipeline reasons
/// only about ground presence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees, [-90, 90]
    pub lat_deg: f64,

    /// Longitude in degrees, [-180, 180]
    pub lon_deg: f64,
}

impl Coordinate {
    /// Creates a coordinate from latitude and longitude in degrees.
    pub fn new(lat_deg: f64, lon_deg: f64) -> Self {
        Self { lat_deg, lon_deg }
    }
}

/// A raw location fix as delivered by a location provider.
///
/// Transient: owned by the caller until consumed into a tile emission or
/// dropped. Never serialized off-device by this crate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresenceSample {
    /// The raw coordinate of the fix
    pub coord: Coordinate,

    /// Wall-clock time of the fix, milliseconds since Unix epoch
    pub epoch_ms: u64,

    /// Horizontal accuracy hint in meters, if the provider supplies one
    pub accuracy_m: Option<f64>,
}

impl PresenceSample {
    /// Creates a sample without an accuracy hint.
    pub fn new(coord: Coordinate, epoch_ms: u64) -> Self {
        Self {
            coord,
            epoch_ms,
            accuracy_m: None,
        }
    }
}

/// The only payload that ever leaves the device: a coarse tile identifier,
/// a timestamp, and the scheduling jitter that was applied.
///
/// Deliberately carries no coordinate, no accuracy, and no stable client
/// identifier. Anonymity here is structural, not cryptographic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileEmission {
    /// Stable string form of the tile id (`"<res>:<x>:<y>"`)
    pub tile_id: String,

    /// Emission time, milliseconds since Unix epoch
    pub epoch_ms: u64,

    /// Scheduling jitter applied before this emission, in milliseconds
    pub jitter_ms: u64,
}

/// Identifier for a venue/cluster in aggregated heat data.
///
/// Uses UUID v4 for uniqueness without coordination. Identifies *places*,
/// never people.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VenueId(pub Uuid);

impl VenueId {
    /// Creates a new random VenueId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a deterministic VenueId from a seed (for simulation).
    pub fn from_seed(seed: u64) -> Self {
        let mut bytes = [0u8; 16];
        bytes[0..8].copy_from_slice(&seed.to_le_bytes());
        bytes[8..16].copy_from_slice(&seed.wrapping_mul(0x517cc1b727220a95).to_le_bytes());
        Self(Uuid::from_bytes(bytes))
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for VenueId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for VenueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Show first 8 chars for readability
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// A rectangular geographic region, used to scope heat-data fetches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// South-west corner
    pub min: Coordinate,

    /// North-east corner
    pub max: Coordinate,
}

impl BoundingBox {
    /// Creates a bounding box from its south-west and north-east corners.
    pub fn new(min: Coordinate, max: Coordinate) -> Self {
        Self { min, max }
    }

    /// Returns true if the coordinate lies within the box (inclusive).
    pub fn contains(&self, coord: &Coordinate) -> bool {
        coord.lat_deg >= self.min.lat_deg
            && coord.lat_deg <= self.max.lat_deg
            && coord.lon_deg >= self.min.lon_deg
            && coord.lon_deg <= self.max.lon_deg
    }
}

/// One venue's worth of aggregated presence, as delivered by a heat source.
///
/// The points are jittered contributor locations around the venue, already
/// anonymized/aggregated upstream; the client only composites them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatSample {
    /// Venue/cluster identifier
    pub venue: VenueId,

    /// Jittered contributor coordinates around the venue
    pub points: Vec<Coordinate>,

    /// Aggregated base intensity, expected in [0, 1]
    pub intensity: f64,

    /// Per-point blob radius in meters
    pub radius_m: f64,
}
