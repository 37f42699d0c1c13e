//! Home presence gate - hysteresis state machine for own-presence emission.
//!
//! Decides whether the user's presence may leave the device *at all*. The
//! decision uses a dual-threshold band around the home coordinate:
//!
//! ```text
//!        hidden ──── d >= outer ────► visible
//!        visible ──── d < inner ────► hidden
//! ```
//!
//! Samples inside the band (inner <= d < outer) never flip the state, so GPS
//! noise near either boundary cannot make the gate oscillate. The gate only
//! answers a boolean; it never emits data itself.

use crate::error::CoreError;
use crate::tiling::distance_meters;
use ember_env::Coordinate;

/// Hysteresis gate over distance-from-home.
#[derive(Debug, Clone)]
pub struct HomePresenceGate {
    /// Home coordinate; absent means presence is always visible
    home: Option<Coordinate>,

    /// Hide threshold: visible -> hidden when d < inner
    inner_m: f64,

    /// Show threshold: hidden -> visible when d >= outer
    outer_m: f64,

    /// Current gate state (initially hidden)
    visible: bool,
}

impl HomePresenceGate {
    /// Creates a gate around a home coordinate.
    ///
    /// Requires `0 < inner < outer`. Starts hidden; callers that need an
    /// immediate answer should run [`force_evaluate`](Self::force_evaluate)
    /// once at startup.
    pub fn new(home: Coordinate, inner_m: f64, outer_m: f64) -> Result<Self, CoreError> {
        if !(inner_m > 0.0 && inner_m < outer_m) {
            return Err(CoreError::InvalidGateRadii { inner_m, outer_m });
        }
        Ok(Self {
            home: Some(home),
            inner_m,
            outer_m,
            visible: false,
        })
    }

    /// Creates a gate with no home set: presence is always visible.
    pub fn without_home() -> Self {
        Self {
            home: None,
            inner_m: 0.0,
            outer_m: 0.0,
            visible: true,
        }
    }

    /// Returns the current gate state without consuming a sample.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Feeds a new location sample through the hysteresis band and returns
    /// the (possibly updated) gate state.
    pub fn observe(&mut self, coord: &Coordinate) -> bool {
        let Some(home) = self.home else {
            self.visible = true;
            return true;
        };

        let d = distance_meters(&home, coord);
        if self.visible {
            if d < self.inner_m {
                self.visible = false;
            }
        } else if d >= self.outer_m {
            self.visible = true;
        }
        self.visible
    }

    /// Evaluates against the single midpoint threshold instead of the band.
    ///
    /// Used only for initialization, where there is no previous state worth
    /// protecting from oscillation.
    pub fn force_evaluate(&mut self, coord: &Coordinate) -> bool {
        let Some(home) = self.home else {
            self.visible = true;
            return true;
        };

        let midpoint = (self.inner_m + self.outer_m) / 2.0;
        self.visible = distance_meters(&home, coord) >= midpoint;
        self.visible
    }
}
