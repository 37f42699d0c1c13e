//! Core environment context trait for the Ember pipeline.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// The central interface for environment interaction.
///
/// This trait abstracts the "real world" so that the presence reporter can
/// run in both production (tokio) and simulation (virtual clock) environments.
///
/// # Implementations
///
/// - **Production**: `TokioContext` - wraps `tokio::time`, `ThreadRng`
/// - **Simulation**: `SimContext` (in `ember_sim`) - virtual clock, `ChaCha8Rng(seed)`
///
/// # Determinism
///
/// The reporter draws its scheduling jitter through `jitter_ms()`, never from
/// an ambient RNG, so a seeded context makes every emission time reproducible.
#[async_trait]
pub trait EmberContext: Send + Sync + 'static {
    /// Returns the current monotonic time since context creation.
    ///
    /// Used for throttle bookkeeping and duration measurements.
    /// In simulation, this is the virtual clock time.
    fn now(&self) -> Duration;

    /// Returns the wall-clock time as milliseconds since the Unix epoch.
    ///
    /// Stamped onto tile emissions. In simulation, this is derived from the
    /// virtual clock plus a fixed epoch offset.
    fn epoch_ms(&self) -> u64;

    /// Suspends execution for the given duration.
    ///
    /// In production: wraps `tokio::time::sleep`
    /// In simulation: advances the virtual clock
    async fn sleep(&self, duration: Duration);

    /// Spawns a background task.
    fn spawn<F>(&self, name: &str, future: F)
    where
        F: Future<Output = ()> + Send + 'static;

    /// Draws a uniformly random delay in `[lo_ms, hi_ms]` (inclusive).
    ///
    /// This is the reporter's temporal jitter. The implementation controls
    /// the entropy source; in simulation it is seeded and reproducible.
    fn jitter_ms(&self, lo_ms: u64, hi_ms: u64) -> u64;

    /// Returns the context's seed (for logging/debugging).
    ///
    /// In production, returns 0 (not seeded).
    /// In simulation, returns the master seed.
    fn seed(&self) -> u64;
}
