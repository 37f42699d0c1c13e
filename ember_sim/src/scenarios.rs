//! Canned scenarios exercising the presence pipeline.

use crate::world::{offset_m, WalkerPath, CITY_CENTER};
use ember_env::Coordinate;

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// Walk circles through the home hysteresis band
    HomeOrbit,

    /// Long walk across town, many tiles, gate open throughout
    CityStroll,

    /// Visit every venue in sequence, lingering at each
    VenueCrawl,

    /// Pace between two adjacent tiles to stress the throttle
    BurstRevisit,
}

/// Everything a runner needs to play a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioSpec {
    /// Walker route
    pub path: WalkerPath,

    /// Home gate configuration, if this scenario has a home
    pub home: Option<HomeSpec>,

    /// Default virtual duration in seconds
    pub duration_secs: f64,
}

/// Home gate parameters for a scenario.
#[derive(Debug, Clone, Copy)]
pub struct HomeSpec {
    pub coord: Coordinate,
    pub inner_m: f64,
    pub outer_m: f64,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::HomeOrbit,
            ScenarioId::CityStroll,
            ScenarioId::VenueCrawl,
            ScenarioId::BurstRevisit,
        ]
    }

    /// CLI name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::HomeOrbit => "home-orbit",
            ScenarioId::CityStroll => "city-stroll",
            ScenarioId::VenueCrawl => "venue-crawl",
            ScenarioId::BurstRevisit => "burst-revisit",
        }
    }

    /// Looks a scenario up by CLI name.
    pub fn from_name(name: &str) -> Option<ScenarioId> {
        Self::all().into_iter().find(|s| s.name() == name)
    }

    /// One-line description for `--help`/logs.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::HomeOrbit => "oscillate through the home hysteresis band; gate must not flap",
            ScenarioId::CityStroll => "3km walk across tiles; steady jittered emissions",
            ScenarioId::VenueCrawl => "linger at each venue; throttle caps per-tile emissions",
            ScenarioId::BurstRevisit => "pace between two tiles; throttle under rapid revisits",
        }
    }

    /// Builds the walker route and gate setup for this scenario.
    pub fn build(&self) -> ScenarioSpec {
        let home = HomeSpec {
            coord: CITY_CENTER,
            inner_m: 137.16,
            outer_m: 167.64,
        };

        match self {
            ScenarioId::HomeOrbit => {
                // Radii sweeping through the band: 100m (inside inner),
                // 150m (in band), 200m (past outer), back again
                let mut waypoints = Vec::new();
                for _ in 0..4 {
                    waypoints.push(offset_m(CITY_CENTER, 0.0, 100.0));
                    waypoints.push(offset_m(CITY_CENTER, 0.0, 150.0));
                    waypoints.push(offset_m(CITY_CENTER, 0.0, 200.0));
                    waypoints.push(offset_m(CITY_CENTER, 0.0, 150.0));
                }
                waypoints.push(offset_m(CITY_CENTER, 0.0, 100.0));
                ScenarioSpec {
                    path: WalkerPath::new(waypoints, 1.5),
                    home: Some(home),
                    duration_secs: 1800.0,
                }
            }
            ScenarioId::CityStroll => ScenarioSpec {
                path: WalkerPath::new(
                    vec![
                        offset_m(CITY_CENTER, 0.0, 400.0),
                        offset_m(CITY_CENTER, 800.0, 400.0),
                        offset_m(CITY_CENTER, 1600.0, -200.0),
                        offset_m(CITY_CENTER, 2400.0, 300.0),
                        offset_m(CITY_CENTER, 3000.0, 0.0),
                    ],
                    1.4,
                ),
                home: Some(home),
                duration_secs: 3600.0,
            },
            ScenarioId::VenueCrawl => ScenarioSpec {
                path: WalkerPath::new(
                    vec![
                        offset_m(CITY_CENTER, 600.0, 250.0),  // cafe
                        offset_m(CITY_CENTER, -400.0, 900.0), // park
                        offset_m(CITY_CENTER, 1200.0, -300.0), // bar
                        offset_m(CITY_CENTER, -900.0, -700.0), // gym
                    ],
                    1.2,
                ),
                home: Some(home),
                duration_secs: 5400.0,
            },
            ScenarioId::BurstRevisit => {
                // Two points one tile apart, revisited far faster than the
                // 60s per-tile window
                let a = offset_m(CITY_CENTER, 0.0, 400.0);
                let b = offset_m(CITY_CENTER, 300.0, 400.0);
                let mut waypoints = Vec::new();
                for _ in 0..20 {
                    waypoints.push(a);
                    waypoints.push(b);
                }
                ScenarioSpec {
                    path: WalkerPath::new(waypoints, 3.0),
                    home: Some(home),
                    duration_secs: 2400.0,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for scenario in ScenarioId::all() {
            assert_eq!(ScenarioId::from_name(scenario.name()), Some(scenario));
        }
        assert_eq!(ScenarioId::from_name("nonsense"), None);
    }

    #[test]
    fn test_specs_are_playable() {
        for scenario in ScenarioId::all() {
            let spec = scenario.build();
            assert!(spec.duration_secs > 0.0);
            // Route sampling never panics
            let _ = spec.path.position_at(0.0);
            let _ = spec.path.position_at(spec.duration_secs);
        }
    }
}
