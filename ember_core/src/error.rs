//! Error types for the Ember core.
//!
//! Nothing in the running pipeline is fatal: degenerate inputs (empty
//! vectors, zero magnitude, too-few hull points, no samples, no home set)
//! resolve to defined neutral outputs. `CoreError` only covers construction
//! and configuration mistakes that a caller should fix at build time.

use thiserror::Error;

/// Construction/configuration errors for core components.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    /// Gate radii must satisfy 0 < inner < outer
    #[error("Invalid gate radii: inner={inner_m}m outer={outer_m}m (require 0 < inner < outer)")]
    InvalidGateRadii { inner_m: f64, outer_m: f64 },

    /// Vocabulary must contain at least one term
    #[error("Vocabulary is empty")]
    EmptyVocabulary,

    /// Vocabulary terms must be unique after normalization
    #[error("Duplicate vocabulary term: {0}")]
    DuplicateVocabularyTerm(String),

    /// Heat blob groups must contain at least one point
    #[error("Heat blob group has no points")]
    EmptyBlobGroup,

    /// Heat blob radius must be strictly positive
    #[error("Heat blob radius must be > 0, got {0}m")]
    NonPositiveBlobRadius(f64),

    /// Tile resolution must be strictly positive
    #[error("Tile resolution must be > 0 meters, got {0}")]
    NonPositiveTileResolution(u32),
}
