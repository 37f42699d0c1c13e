//! Error types for the Ember environment abstraction.

use thiserror::Error;

/// Errors that can occur in the environment abstraction layer.
///
/// None of these are fatal to the pipeline: a failed emission is logged and
/// dropped, a failed heat fetch leaves the overlay empty.
#[derive(Debug, Error)]
pub enum EnvError {
    /// Emission sink rejected or failed to queue a tile emission
    #[error("Sink error: {0}")]
    SinkError(String),

    /// Collaborator is unavailable (no network client, no heat backend)
    #[error("Unavailable: {0}")]
    Unavailable(String),
}

impl EnvError {
    /// Creates a sink error.
    pub fn sink(msg: impl Into<String>) -> Self {
        Self::SinkError(msg.into())
    }

    /// Creates an unavailable error.
    pub fn unavailable(what: impl std::fmt::Display) -> Self {
        Self::Unavailable(what.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpers_build_displayable_errors() {
        assert_eq!(
            EnvError::sink("buffer full").to_string(),
            "Sink error: buffer full"
        );
        assert_eq!(
            EnvError::unavailable("no heat backend").to_string(),
            "Unavailable: no heat backend"
        );
    }
}
