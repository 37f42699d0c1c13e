//! SimWorld - synthetic venues, contributor clouds, and a scripted walker.
//!
//! Substitutes for the live collaborators: venues stand in for the
//! aggregated heat backend, the walker path stands in for the device
//! location provider, and scripted sources stand in for OAuth/photo
//! integrations. Everything derives from the world seed.

use async_trait::async_trait;
use ember_core::heatmap::HeatBlobGroup;
use ember_core::interests::InterestSource;
use ember_core::tiling::METERS_PER_DEGREE_LAT;
use ember_env::{
    BoundingBox, Coordinate, EnvError, HeatSample, HeatSource, LocationProvider, PresenceSample,
    VenueId,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Simulation city center (San Francisco).
pub const CITY_CENTER: Coordinate = Coordinate {
    lat_deg: 37.7749,
    lon_deg: -122.4194,
};

/// Offsets a coordinate by meters east/north.
pub fn offset_m(base: Coordinate, east_m: f64, north_m: f64) -> Coordinate {
    let lat = base.lat_deg + north_m / METERS_PER_DEGREE_LAT;
    let lon = base.lon_deg + east_m / (METERS_PER_DEGREE_LAT * base.lat_deg.to_radians().cos());
    Coordinate::new(lat, lon)
}

/// A synthetic venue with an interest profile and contributor presence.
#[derive(Debug, Clone)]
pub struct Venue {
    /// Venue identifier
    pub id: VenueId,

    /// Display name (logging only)
    pub name: &'static str,

    /// Venue location
    pub center: Coordinate,

    /// Interest profile: tags a typical contributor here carries
    pub profile: Vec<(&'static str, f64)>,

    /// Baseline popularity in [0, 1], scales blob intensity
    pub popularity: f64,

    /// Number of jittered contributor points to synthesize
    pub contributors: usize,
}

/// The synthetic world: venues plus a seeded point-cloud generator.
pub struct SimWorld {
    venues: Vec<Venue>,
    rng: ChaCha8Rng,
}

impl SimWorld {
    /// Creates the default venue set for a seed.
    pub fn new(seed: u64) -> Self {
        let venues = vec![
            Venue {
                id: VenueId::from_seed(seed ^ 1),
                name: "Mission Cafe",
                center: offset_m(CITY_CENTER, 600.0, 250.0),
                profile: vec![("cafe", 6.0), ("books", 2.0), ("art", 1.0)],
                popularity: 0.8,
                contributors: 12,
            },
            Venue {
                id: VenueId::from_seed(seed ^ 2),
                name: "Dolores Park",
                center: offset_m(CITY_CENTER, -400.0, 900.0),
                profile: vec![("park", 5.0), ("outdoors", 3.0), ("community", 2.0)],
                popularity: 0.9,
                contributors: 20,
            },
            Venue {
                id: VenueId::from_seed(seed ^ 3),
                name: "Night Owl Bar",
                center: offset_m(CITY_CENTER, 1200.0, -300.0),
                profile: vec![("bar", 5.0), ("nightlife", 4.0), ("music", 2.0)],
                popularity: 0.6,
                contributors: 8,
            },
            Venue {
                id: VenueId::from_seed(seed ^ 4),
                name: "Waterfront Gym",
                center: offset_m(CITY_CENTER, -900.0, -700.0),
                profile: vec![("fitness", 6.0), ("wellness", 2.0), ("sports", 2.0)],
                popularity: 0.5,
                contributors: 10,
            },
        ];

        Self {
            venues,
            rng: ChaCha8Rng::seed_from_u64(seed.wrapping_mul(0x9e3779b97f4a7c15)),
        }
    }

    /// The venue list.
    pub fn venues(&self) -> &[Venue] {
        &self.venues
    }

    /// Synthesizes jittered contributor point clouds for every venue.
    ///
    /// Points are drawn from a normal distribution around each venue center
    /// (sigma `scatter_m`), mimicking the upstream aggregator's jitter.
    /// Intensity is the venue popularity scaled by `intensity_scale` -
    /// callers pass the similarity-derived heat weight here.
    pub fn heat_groups(
        &mut self,
        scatter_m: f64,
        radius_m: f64,
        intensity_scale: &dyn Fn(&Venue) -> f64,
    ) -> Vec<HeatBlobGroup> {
        let normal = Normal::new(0.0, scatter_m).expect("finite sigma");
        let mut groups = Vec::with_capacity(self.venues.len());

        for venue in &self.venues {
            let points: Vec<Coordinate> = (0..venue.contributors)
                .map(|_| {
                    let east = normal.sample(&mut self.rng);
                    let north = normal.sample(&mut self.rng);
                    offset_m(venue.center, east, north)
                })
                .collect();

            let intensity = venue.popularity * intensity_scale(venue);
            if let Ok(group) = HeatBlobGroup::new(Some(venue.id), points, intensity, radius_m) {
                groups.push(group);
            }
        }

        groups
    }
}

/// Heat backend substitute: serves jittered per-venue samples for a region
/// through the same [`HeatSource`] trait a live aggregator would implement.
pub struct SimHeatSource {
    world: Mutex<SimWorld>,
    scatter_m: f64,
    radius_m: f64,
}

impl SimHeatSource {
    pub fn new(seed: u64, scatter_m: f64, radius_m: f64) -> Self {
        Self {
            world: Mutex::new(SimWorld::new(seed)),
            scatter_m,
            radius_m,
        }
    }
}

#[async_trait]
impl HeatSource for SimHeatSource {
    async fn fetch(&self, region: BoundingBox) -> Result<Vec<HeatSample>, EnvError> {
        let mut world = self.world.lock().unwrap();
        let groups = world.heat_groups(self.scatter_m, self.radius_m, &|_| 1.0);
        let centers: Vec<Coordinate> = world.venues().iter().map(|v| v.center).collect();

        Ok(groups
            .into_iter()
            .zip(centers)
            .filter(|(_, center)| region.contains(center))
            .filter_map(|(group, _)| {
                group.venue.map(|venue| HeatSample {
                    venue,
                    points: group.points,
                    intensity: group.base_intensity,
                    radius_m: group.radius_m,
                })
            })
            .collect())
    }
}

/// A scripted walker path: piecewise-linear waypoints at constant speed.
#[derive(Debug, Clone)]
pub struct WalkerPath {
    waypoints: Vec<Coordinate>,
    speed_mps: f64,
}

impl WalkerPath {
    /// Creates a path through the waypoints at the given speed.
    ///
    /// A single waypoint means the walker stands still.
    pub fn new(waypoints: Vec<Coordinate>, speed_mps: f64) -> Self {
        Self {
            waypoints,
            speed_mps,
        }
    }

    /// Position after `t_secs` of walking; clamps at the final waypoint.
    pub fn position_at(&self, t_secs: f64) -> Coordinate {
        let mut remaining = self.speed_mps * t_secs.max(0.0);

        for pair in self.waypoints.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let leg = ember_core::tiling::distance_meters(&from, &to);
            if leg <= f64::EPSILON {
                continue;
            }
            if remaining < leg {
                let f = remaining / leg;
                return Coordinate::new(
                    from.lat_deg + (to.lat_deg - from.lat_deg) * f,
                    from.lon_deg + (to.lon_deg - from.lon_deg) * f,
                );
            }
            remaining -= leg;
        }

        *self.waypoints.last().expect("path has at least one waypoint")
    }
}

/// Location provider fed by the scenario runner.
pub struct SimLocationProvider {
    current: Mutex<Option<PresenceSample>>,
    authorized: AtomicBool,
}

impl SimLocationProvider {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(None),
            authorized: AtomicBool::new(true),
        }
    }

    /// Updates the walker's current fix.
    pub fn set_fix(&self, sample: PresenceSample) {
        *self.current.lock().unwrap() = Some(sample);
    }

    /// Simulates the user toggling location permission.
    pub fn set_authorized(&self, authorized: bool) {
        self.authorized.store(authorized, Ordering::SeqCst);
    }
}

impl Default for SimLocationProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationProvider for SimLocationProvider {
    fn latest_sample(&self) -> Option<PresenceSample> {
        *self.current.lock().unwrap()
    }

    fn authorized(&self) -> bool {
        self.authorized.load(Ordering::SeqCst)
    }
}

/// A canned interest source with fixed tags.
pub struct ScriptedSource {
    name: String,
    tags: Vec<(String, f64)>,
}

impl ScriptedSource {
    pub fn new(name: &str, tags: &[(&str, f64)]) -> Self {
        Self {
            name: name.to_string(),
            tags: tags.iter().map(|(t, w)| (t.to_string(), *w)).collect(),
        }
    }
}

impl InterestSource for ScriptedSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn interest_tags(&self) -> HashMap<String, f64> {
        self.tags.iter().cloned().collect()
    }
}

/// Interest source implemented over a venue profile, so viewer/venue
/// similarity runs through the same encoder as real sources.
pub struct VenueProfileSource<'a>(pub &'a Venue);

impl InterestSource for VenueProfileSource<'_> {
    fn name(&self) -> &str {
        "venue_profile"
    }

    fn interest_tags(&self) -> HashMap<String, f64> {
        self.0
            .profile
            .iter()
            .map(|(t, w)| (t.to_string(), *w))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::tiling::distance_meters;

    #[test]
    fn test_world_is_seed_deterministic() {
        let mut a = SimWorld::new(11);
        let mut b = SimWorld::new(11);

        let ga = a.heat_groups(25.0, 15.0, &|_| 1.0);
        let gb = b.heat_groups(25.0, 15.0, &|_| 1.0);
        assert_eq!(ga, gb);
    }

    #[test]
    fn test_contributor_points_scatter_near_center() {
        let mut world = SimWorld::new(5);
        let groups = world.heat_groups(25.0, 15.0, &|_| 1.0);

        for (group, venue) in groups.iter().zip(world.venues()) {
            assert_eq!(group.points.len(), venue.contributors);
            for p in &group.points {
                // 6 sigma: effectively always
                assert!(distance_meters(p, &venue.center) < 150.0);
            }
        }
    }

    #[test]
    fn test_walker_path_interpolates() {
        let a = CITY_CENTER;
        let b = offset_m(CITY_CENTER, 0.0, 1000.0);
        let path = WalkerPath::new(vec![a, b], 2.0); // 2 m/s

        let start = path.position_at(0.0);
        assert!(distance_meters(&start, &a) < 1.0);

        let mid = path.position_at(250.0); // 500m in
        assert!((distance_meters(&a, &mid) - 500.0).abs() < 5.0);

        // Clamped at the end
        let end = path.position_at(10_000.0);
        assert!(distance_meters(&end, &b) < 1.0);
    }

    #[test]
    fn test_single_waypoint_stands_still() {
        let path = WalkerPath::new(vec![CITY_CENTER], 2.0);
        let p = path.position_at(500.0);
        assert!(distance_meters(&p, &CITY_CENTER) < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_heat_source_scopes_to_region() {
        use ember_core::heatmap::{EquirectangularView, HeatBlobCompositor};

        let source = SimHeatSource::new(9, 25.0, 15.0);

        let city = BoundingBox::new(
            offset_m(CITY_CENTER, -2000.0, -2000.0),
            offset_m(CITY_CENTER, 2000.0, 2000.0),
        );
        let samples = source.fetch(city).await.unwrap();
        assert_eq!(samples.len(), 4, "every venue lies inside the city box");

        // Fetched samples flow straight into the compositor
        let groups: Vec<HeatBlobGroup> = samples
            .into_iter()
            .map(|s| HeatBlobGroup::from_sample(s).unwrap())
            .collect();
        let view = EquirectangularView {
            center: CITY_CENTER,
            units_per_meter: 1.0,
        };
        let overlay = HeatBlobCompositor::default().composite(&groups, &view);
        assert_eq!(overlay.commands.len(), 4);

        let elsewhere = BoundingBox::new(
            offset_m(CITY_CENTER, 50_000.0, 50_000.0),
            offset_m(CITY_CENTER, 51_000.0, 51_000.0),
        );
        assert!(source.fetch(elsewhere).await.unwrap().is_empty());
    }

    #[test]
    fn test_location_provider_authorization() {
        let provider = SimLocationProvider::new();
        assert!(provider.authorized());
        assert!(provider.latest_sample().is_none());

        provider.set_fix(PresenceSample::new(CITY_CENTER, 0));
        assert!(provider.latest_sample().is_some());

        provider.set_authorized(false);
        assert!(!provider.authorized());
    }
}
