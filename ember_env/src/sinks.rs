//! Collaborator abstractions for the Ember pipeline.
//!
//! The core never performs blocking I/O itself: location, the emission
//! network client, and the aggregated heat backend are all external
//! collaborators reached through these traits.

use crate::error::EnvError;
use crate::types::{BoundingBox, HeatSample, PresenceSample, TileEmission};
use async_trait::async_trait;

/// Latest-known-location collaborator.
///
/// The reporter *pulls* from this on each tick; location updates are never
/// pushed into the pipeline. A provider that has no fix (or no permission)
/// simply returns `None`, which the reporter treats as a silent no-op.
pub trait LocationProvider: Send + Sync {
    /// Returns the most recent location fix, if any.
    fn latest_sample(&self) -> Option<PresenceSample>;

    /// Returns true if the user has granted location access.
    fn authorized(&self) -> bool;
}

/// Abstraction for the tile emission network client.
///
/// # Packet Flow
///
/// ```text
/// Reporter                     Sink                     Aggregator
///   |                           |                          |
///   |-- send(tile,t,jitter) --->|                          |
///   |                           |-- [network, upstream] -->|
/// ```
///
/// The reporter hands the sink a [`TileEmission`] and nothing else; raw
/// coordinates never reach this boundary.
#[async_trait]
pub trait EmissionSink: Send + Sync {
    /// Queues a tile emission for delivery.
    ///
    /// # Returns
    /// * `Ok(())` - Emission queued
    /// * `Err(EnvError::SinkError)` - Immediate failure (e.g., buffer full)
    ///
    /// # Note
    /// Success does not guarantee delivery; the reporter never retries, it
    /// simply emits again on a later tick.
    async fn send(&self, emission: TileEmission) -> Result<(), EnvError>;
}

/// Aggregated presence data collaborator.
///
/// Supplies per-venue heat samples for a viewport; in the absence of a live
/// backend, a local synthetic generator may substitute (see `ember_sim`).
#[async_trait]
pub trait HeatSource: Send + Sync {
    /// Fetches heat samples for the given region.
    async fn fetch(&self, region: BoundingBox) -> Result<Vec<HeatSample>, EnvError>;
}
