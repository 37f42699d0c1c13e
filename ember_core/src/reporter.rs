//! Presence reporter - jittered, throttled tile emission.
//!
//! Decides *when* and *whether* to emit a tile identifier, without ever
//! emitting a raw coordinate. Two mechanisms resist trajectory
//! reconstruction from reporting cadence:
//!
//! - **Temporal jitter**: the next tick is scheduled after a uniformly
//!   random delay in `[min_interval, max_interval]`, re-armed after every
//!   tick (never a fixed-period timer, so the jitter is exact per cycle).
//! - **Spatial throttling**: a per-tile cool-down suppresses repeat
//!   emissions for the same cell inside `per_tile_min_interval`.
//!
//! Failure semantics: no sample, no authorization, gate hidden, and
//! throttled are all silent no-ops - never fatal.
//!
//! The pure decision logic lives in [`PresenceReporter::tick`] so it can be
//! driven by a virtual clock; [`ReporterRuntime`] wires it to an
//! [`EmberContext`] timer loop for production.

use crate::error::CoreError;
use crate::gate::HomePresenceGate;
use crate::tiling::{SpatialTiler, TileId};
use ember_env::{EmberContext, EmissionSink, LocationProvider, PresenceSample, TileEmission};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for the presence reporter.
#[derive(Debug, Clone)]
pub struct ReporterConfig {
    /// Tile resolution in meters per cell (default: 250)
    pub meters_per_tile: u32,

    /// Per-tile cool-down between emissions (default: 60s)
    pub per_tile_min_interval: Duration,

    /// Lower bound of the randomized tick delay (default: 15s)
    pub min_interval: Duration,

    /// Upper bound of the randomized tick delay (default: 45s)
    pub max_interval: Duration,

    /// Idle period after which a tile's throttle entry is evicted
    /// (default: 1h)
    pub throttle_ttl: Duration,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            meters_per_tile: 250,
            per_tile_min_interval: Duration::from_secs(60),
            min_interval: Duration::from_secs(15),
            max_interval: Duration::from_secs(45),
            throttle_ttl: Duration::from_secs(3600),
        }
    }
}

/// Why a tick produced no emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuppressReason {
    /// No sample available (no provider, no fix, or not authorized)
    NoSample,

    /// The home gate currently hides presence
    GateHidden,

    /// The tile was emitted too recently
    Throttled(TileId),
}

/// Result of a single reporter tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// A tile emission is ready for the sink
    Emitted(TileEmission),

    /// Nothing left the device this tick
    Suppressed(SuppressReason),
}

/// The pure tick state machine.
///
/// Holds the tiler, the home gate, and the per-tile throttle map. Throttle
/// state deliberately persists across runtime stop/start within a session:
/// restarting the reporter must not grant a fresh emission budget.
#[derive(Debug)]
pub struct PresenceReporter {
    config: ReporterConfig,
    tiler: SpatialTiler,
    gate: HomePresenceGate,
    last_emission: HashMap<TileId, Duration>,
}

impl PresenceReporter {
    /// Creates a reporter with the given config and home gate.
    pub fn new(config: ReporterConfig, gate: HomePresenceGate) -> Result<Self, CoreError> {
        let tiler = SpatialTiler::new(config.meters_per_tile)?;
        Ok(Self {
            config,
            tiler,
            gate,
            last_emission: HashMap::new(),
        })
    }

    /// Returns the reporter configuration.
    pub fn config(&self) -> &ReporterConfig {
        &self.config
    }

    /// Returns the home gate (read-only).
    pub fn gate(&self) -> &HomePresenceGate {
        &self.gate
    }

    /// Mutable access to the gate, e.g. for `force_evaluate` at startup.
    pub fn gate_mut(&mut self) -> &mut HomePresenceGate {
        &mut self.gate
    }

    /// Number of tiles currently tracked by the throttle map.
    pub fn tracked_tiles(&self) -> usize {
        self.last_emission.len()
    }

    /// Runs one reporting tick.
    ///
    /// * `now` - monotonic time for throttle bookkeeping
    /// * `epoch_ms` - wall-clock stamp for the emission payload
    /// * `sample` - latest location fix pulled from the provider, if any
    /// * `jitter_ms` - the randomized delay that scheduled this tick
    pub fn tick(
        &mut self,
        now: Duration,
        epoch_ms: u64,
        sample: Option<PresenceSample>,
        jitter_ms: u64,
    ) -> TickOutcome {
        // Bounded map: drop entries idle past the TTL
        let ttl = self.config.throttle_ttl;
        self.last_emission
            .retain(|_, last| now.saturating_sub(*last) <= ttl);

        let Some(sample) = sample else {
            return TickOutcome::Suppressed(SuppressReason::NoSample);
        };

        if !self.gate.observe(&sample.coord) {
            // No emission, no throttle update while hidden
            return TickOutcome::Suppressed(SuppressReason::GateHidden);
        }

        let tile = self.tiler.tile_for(&sample.coord);
        if let Some(last) = self.last_emission.get(&tile) {
            if now.saturating_sub(*last) < self.config.per_tile_min_interval {
                return TickOutcome::Suppressed(SuppressReason::Throttled(tile));
            }
        }

        self.last_emission.insert(tile, now);
        TickOutcome::Emitted(TileEmission {
            tile_id: tile.to_string(),
            epoch_ms,
            jitter_ms,
        })
    }
}

/// Timer-driven wrapper that runs the reporter against an environment
/// context, a location provider, and an emission sink.
///
/// Generic over the context so the same loop runs in production (tokio) and
/// simulation (virtual clock).
pub struct ReporterRuntime<Ctx: EmberContext> {
    ctx: Arc<Ctx>,
    location: Arc<dyn LocationProvider>,
    sink: Arc<dyn EmissionSink>,
    state: Arc<Mutex<PresenceReporter>>,
    generation: Arc<AtomicU64>,
}

impl<Ctx: EmberContext> ReporterRuntime<Ctx> {
    /// Creates a runtime around an already-configured reporter.
    pub fn new(
        ctx: Arc<Ctx>,
        location: Arc<dyn LocationProvider>,
        sink: Arc<dyn EmissionSink>,
        reporter: PresenceReporter,
    ) -> Self {
        Self {
            ctx,
            location,
            sink,
            state: Arc::new(Mutex::new(reporter)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Shared handle to the reporter state (for inspection/tests).
    pub fn state(&self) -> Arc<Mutex<PresenceReporter>> {
        Arc::clone(&self.state)
    }

    /// Starts (or restarts) the repeating single-shot timer loop.
    ///
    /// Idempotent: starting again invalidates any previous loop at its next
    /// wake-up, exactly like [`stop`](Self::stop) followed by a fresh start.
    pub fn start(&self) {
        let my_gen = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let ctx = Arc::clone(&self.ctx);
        let location = Arc::clone(&self.location);
        let sink = Arc::clone(&self.sink);
        let state = Arc::clone(&self.state);
        let generation = Arc::clone(&self.generation);

        self.ctx.spawn("presence-reporter", async move {
            loop {
                let (lo_ms, hi_ms) = {
                    let s = state.lock().unwrap();
                    (
                        s.config().min_interval.as_millis() as u64,
                        s.config().max_interval.as_millis() as u64,
                    )
                };
                let jitter_ms = ctx.jitter_ms(lo_ms, hi_ms);
                ctx.sleep(Duration::from_millis(jitter_ms)).await;

                let outcome = {
                    // Generation is checked under the state lock so a stop()
                    // that has returned can never be followed by a tick.
                    let mut s = state.lock().unwrap();
                    if generation.load(Ordering::SeqCst) != my_gen {
                        break;
                    }
                    let sample = if location.authorized() {
                        location.latest_sample()
                    } else {
                        None
                    };
                    s.tick(ctx.now(), ctx.epoch_ms(), sample, jitter_ms)
                };

                match outcome {
                    TickOutcome::Emitted(emission) => {
                        debug!(tile = %emission.tile_id, jitter_ms, "emitting presence tile");
                        if let Err(err) = sink.send(emission).await {
                            // Dropped, not retried; the next tick emits anew
                            warn!(%err, "tile emission failed");
                        }
                    }
                    TickOutcome::Suppressed(reason) => {
                        debug!(?reason, "presence emission suppressed");
                    }
                }
            }
        });
    }

    /// Stops the timer loop.
    ///
    /// Deterministic: once `stop` returns, no further tick can run. An
    /// emission already decided by the last tick may still be delivered to
    /// the sink shortly after; only the *decision* is fenced by the lock.
    /// Throttle state is retained for a later `start` within the same
    /// session.
    pub fn stop(&self) {
        let _guard = self.state.lock().unwrap();
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}
