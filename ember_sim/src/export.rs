//! JSON frame export for offline inspection of a simulation run.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use thiserror::Error;

/// Errors while writing an export file.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One sampled frame of a run.
///
/// Frames carry run *state*, not payloads: the walker's true position stays
/// in the simulator, mirroring the privacy boundary under test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimFrame {
    /// Virtual time in seconds
    pub time_sec: f64,

    /// Gate state at this frame
    pub gate_visible: bool,

    /// Emissions so far
    pub emissions: usize,

    /// Unique tiles emitted so far
    pub unique_tiles: usize,

    /// Heat blobs in the latest composited overlay
    pub blobs: usize,
}

/// A full export: run metadata plus sampled frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimExport {
    pub scenario: String,
    pub seed: u64,
    pub frames: Vec<SimFrame>,
}

impl SimExport {
    /// Creates an empty export for a run.
    pub fn new(scenario: &str, seed: u64) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed,
            frames: Vec::new(),
        }
    }

    /// Appends a frame.
    pub fn add_frame(&mut self, frame: SimFrame) {
        self.frames.push(frame);
    }

    /// Writes the export as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}
