//! Ember Deterministic Simulation Harness
//!
//! Runs the whole client pipeline - gate, reporter, aggregation, encoding,
//! similarity, compositing - against a controlled synthetic world, with all
//! sources of non-determinism derived from a single 64-bit seed.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     ScenarioRunner                       │
//! │  ┌───────────────────────────────────────────────────┐   │
//! │  │ SimContext (virtual clock + seeded jitter)        │   │
//! │  └───────────────────────────────────────────────────┘   │
//! │       │                          │                       │
//! │  ┌────▼─────┐              ┌─────▼──────┐                │
//! │  │ SimWorld │─── samples ─►│  Reporter  │                │
//! │  │ (walker, │              │ gate+tiles │                │
//! │  │  venues) │              └─────┬──────┘                │
//! │  └────┬─────┘                    │ emissions             │
//! │       │ heat groups        ┌─────▼──────────┐            │
//! │  ┌────▼───────────┐        │ PrivacyOracle  │            │
//! │  │  Compositor    │        │ (invariants)   │            │
//! │  └────────────────┘        └────────────────┘            │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The oracle replays every tick outcome against the privacy contract:
//! no emission while hidden, no per-tile emission inside the throttle
//! window, no raw coordinate in any payload. Any violation is reported with
//! the seed that reproduces it.

mod context;
mod export;
mod oracle;
mod runner;
pub mod scenarios;
mod world;

pub use context::SimContext;
pub use export::{ExportError, SimExport, SimFrame};
pub use oracle::{OracleStats, PrivacyOracle};
pub use runner::{ScenarioResult, ScenarioRunner, SimConfig};
pub use world::{
    ScriptedSource, SimHeatSource, SimLocationProvider, SimWorld, Venue, VenueProfileSource,
    WalkerPath,
};
