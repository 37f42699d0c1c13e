//! Ember Core - Privacy-Preserving Presence Pipeline & Heat Rendering
//!
//! This library implements the two halves of the Ember client core:
//! 1. **Presence half**: coarse spatial tiling, a hysteresis home gate, and a
//!    jittered, throttled tile reporter - raw coordinates never leave it.
//! 2. **Interest half**: weighted tag aggregation over a closed vocabulary,
//!    TF-IDF-style vector encoding, cosine similarity, and convex-hull heat
//!    blob compositing weighted by that similarity.
//!
//! Server-side aggregation (k-anonymity gating, differential-privacy noise)
//! is an external collaborator; this crate covers only the client half.

pub mod error;
pub mod gate;
pub mod heatmap;
pub mod interests;
pub mod reporter;
pub mod similarity;
pub mod tiling;
pub mod vector;

#[cfg(feature = "visualization")]
pub mod visualization;

// Re-export key types for convenience
pub use error::CoreError;
pub use gate::HomePresenceGate;
pub use heatmap::{HeatBlobCompositor, HeatBlobGroup, HeatOverlay, MapProjection};
pub use interests::{aggregate, InterestSource, SourceWeights, SynonymTable, Vocabulary};
pub use reporter::{PresenceReporter, ReporterConfig, ReporterRuntime, TickOutcome};
pub use similarity::{cosine_similarity, diversity, heat_weight, HeatWeightParams};
pub use tiling::{distance_meters, SpatialTiler, TileId};
pub use vector::{assess_quality, encode, InterestVector, VectorQuality};

// Shared coordinate domain lives in the env crate alongside the collaborator
// traits that produce/consume it.
pub use ember_env::{Coordinate, PresenceSample, TileEmission};
