//! Ember Environment Abstraction Layer
//!
//! This crate provides the "Sans-IO" abstraction allowing the Ember presence
//! pipeline to run in both **Production** (tokio) and **Simulation**
//! (virtual clock) environments.
//!
//! # Core Concept
//!
//! The privacy guarantees of the reporter depend on *timing*: randomized
//! scheduling jitter and per-tile throttle windows. To test those guarantees
//! deterministically, all sources of non-determinism are intercepted:
//! - Time (`now()`, `epoch_ms()`, `sleep()`)
//! - Randomness (`jitter_ms()`)
//!
//! By deriving all entropy from a single 64-bit seed, any timing bug becomes
//! reproducible via its seed number.
//!
//! # Example
//!
//! ```ignore
//! use ember_env::{EmberContext, EmissionSink};
//!
//! async fn report_loop<Ctx: EmberContext>(ctx: &Ctx, sink: &dyn EmissionSink) {
//!     loop {
//!         let delay_ms = ctx.jitter_ms(15_000, 45_000);
//!         ctx.sleep(Duration::from_millis(delay_ms)).await;
//!         // ... tick, maybe emit through the sink ...
//!     }
//! }
//! ```

mod context;
mod error;
mod sinks;
mod tokio_impl;
mod types;

pub use context::EmberContext;
pub use error::EnvError;
pub use sinks::{EmissionSink, HeatSource, LocationProvider};
pub use tokio_impl::TokioContext;
pub use types::{BoundingBox, Coordinate, HeatSample, PresenceSample, TileEmission, VenueId};
