//! Debug visualization of heat overlays using Rerun.io
//!
//! Logs the compositor's draw plan - hull outlines, gradient centers, and
//! intensities - so the blob geometry can be inspected without a full map
//! renderer. Enable with the `visualization` feature flag.

use crate::heatmap::{BlobDrawCommand, HeatOverlay};
use rerun::{RecordingStream, RecordingStreamBuilder};

/// Rerun-based visualizer for Ember heat overlays.
pub struct HeatOverlayVisualizer {
    rec: RecordingStream,
}

impl HeatOverlayVisualizer {
    /// Create a new visualizer that spawns the Rerun viewer.
    pub fn new(app_id: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let rec = RecordingStreamBuilder::new(app_id).spawn()?;
        Ok(Self { rec })
    }

    /// Create a visualizer that saves to a file (for sharing).
    pub fn new_to_file(app_id: &str, path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let rec = RecordingStreamBuilder::new(app_id).save(path)?;
        Ok(Self { rec })
    }

    /// Log a full overlay frame.
    pub fn log_overlay(&self, overlay: &HeatOverlay) -> Result<(), Box<dyn std::error::Error>> {
        for (idx, command) in overlay.commands.iter().enumerate() {
            self.log_blob(idx, command)?;
        }

        self.rec.log(
            "overlay/stats/blobs",
            &rerun::Scalars::new([overlay.commands.len() as f64]),
        )?;

        Ok(())
    }

    /// Log one blob command: hull outline, centroid, and gradient extent.
    fn log_blob(
        &self,
        idx: usize,
        command: &BlobDrawCommand,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let label = match command.venue {
            Some(venue) => format!("overlay/blobs/{venue}"),
            None => format!("overlay/blobs/anon_{idx}"),
        };

        // Closed hull outline
        let mut strip: Vec<[f32; 2]> = command
            .clip
            .outline
            .iter()
            .map(|p| [p.x as f32, p.y as f32])
            .collect();
        if let Some(first) = strip.first().copied() {
            strip.push(first);
        }

        let inner_alpha = command
            .gradient
            .stops
            .first()
            .map(|s| s.alpha)
            .unwrap_or(0.0);
        let alpha = (inner_alpha * 255.0) as u8;

        self.rec.log(
            format!("{label}/hull"),
            &rerun::LineStrips2D::new([strip])
                .with_colors([[255, 120, 40, alpha]])
                .with_radii([(command.clip.stroke_width / 2.0) as f32]),
        )?;

        self.rec.log(
            format!("{label}/center"),
            &rerun::Points2D::new([[
                command.gradient.center.x as f32,
                command.gradient.center.y as f32,
            ]])
            .with_colors([[255, 255, 255, 255]])
            .with_radii([2.0]),
        )?;

        self.rec.log(
            format!("{label}/extent"),
            &rerun::Scalars::new([command.gradient.radius]),
        )?;

        Ok(())
    }

    /// Set the current frame for timeline scrubbing.
    pub fn set_frame(&self, frame: u64) {
        self.rec.set_time_sequence("frame", frame as i64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore] // Requires Rerun viewer
    fn test_visualizer_creation() {
        let viz = HeatOverlayVisualizer::new("ember_test");
        assert!(viz.is_ok());
    }
}
