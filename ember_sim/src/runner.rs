//! ScenarioRunner - drives the full pipeline on the virtual clock.
//!
//! One run wires together the walker (location provider), the gate and
//! reporter (tile emission), the interest stack (aggregate -> encode ->
//! similarity -> heat weight), and the compositor, then replays every tick
//! outcome through the privacy oracle.

use crate::context::SimContext;
use crate::export::{SimExport, SimFrame};
use crate::oracle::{OracleStats, PrivacyOracle};
use crate::scenarios::ScenarioId;
use crate::world::{
    ScriptedSource, SimLocationProvider, SimWorld, VenueProfileSource, CITY_CENTER,
};
use ember_core::gate::HomePresenceGate;
use ember_core::heatmap::{EquirectangularView, HeatBlobCompositor};
use ember_core::interests::{aggregate, InterestSource, SourceWeights, SynonymTable, Vocabulary};
use ember_core::reporter::{PresenceReporter, ReporterConfig};
use ember_core::similarity::{cosine_similarity, heat_weight, HeatWeightParams};
use ember_core::vector::{assess_quality, encode, VectorQuality};
use ember_env::{EmberContext, LocationProvider, PresenceSample, VenueId};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Master seed for determinism
    pub seed: u64,

    /// Override of the scenario's default virtual duration, in seconds
    pub duration_secs: Option<f64>,

    /// Reporter configuration under test
    pub reporter: ReporterConfig,

    /// Composite + export a frame every N ticks
    pub frame_interval_ticks: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            duration_secs: None,
            reporter: ReporterConfig::default(),
            frame_interval_ticks: 10,
        }
    }
}

/// Outcome of one scenario run.
#[derive(Debug)]
pub struct ScenarioResult {
    pub scenario: &'static str,
    pub seed: u64,
    pub ticks: u64,
    pub stats: OracleStats,
    pub violations: Vec<String>,
    pub vector_quality: VectorQuality,
    pub mean_heat_weight: f64,
    pub final_blobs: usize,
    pub export: SimExport,
}

impl ScenarioResult {
    /// True when the privacy oracle saw no violations.
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Runs scenarios against a seeded virtual world.
pub struct ScenarioRunner {
    config: SimConfig,
}

impl ScenarioRunner {
    /// Creates a runner.
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }

    /// Plays one scenario to completion.
    pub fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        let seed = self.config.seed;
        let ctx = SimContext::new(seed);
        let spec = scenario.build();
        let mut world = SimWorld::new(seed);
        let provider = SimLocationProvider::new();

        let gate = match spec.home {
            Some(home) => HomePresenceGate::new(home.coord, home.inner_m, home.outer_m)
                .expect("scenario gate radii are valid"),
            None => HomePresenceGate::without_home(),
        };
        let mut reporter = PresenceReporter::new(self.config.reporter.clone(), gate)
            .expect("scenario reporter config is valid");
        let mut oracle = PrivacyOracle::new(seed, self.config.reporter.per_tile_min_interval);

        // Initialization: seed the gate from the walker's starting position
        // with the midpoint rule, the same way the app does on launch
        let start = spec.path.position_at(0.0);
        reporter.gate_mut().force_evaluate(&start);

        // --- interest half: viewer profile -> per-venue heat weights ------

        let vocab = Vocabulary::builtin();
        let synonyms = SynonymTable::builtin();
        let weights = SourceWeights::default();

        let ratings = ScriptedSource::new("ratings", &[("Cafe", 4.0), ("park", 3.0), ("books", 2.0)]);
        let music = ScriptedSource::new("music", &[("concerts", 5.0), ("nightlife", 1.0)]);
        let photos = ScriptedSource::new("photos", &[("hiking", 3.0), ("brunch", 2.0)]);
        let filter = ScriptedSource::new("content_filter", &[("nightlife", 2.0)]);
        let sources: Vec<&dyn InterestSource> = vec![&ratings, &music, &photos, &filter];

        let accumulated = aggregate(&sources, &weights, &synonyms, &vocab);
        let viewer = encode(&accumulated, &vocab);
        let vector_quality = assess_quality(&accumulated, sources.len(), sources.len(), &vocab);

        let params = HeatWeightParams::default();
        let venue_weights: HashMap<VenueId, f64> = world
            .venues()
            .iter()
            .map(|venue| {
                let profile = VenueProfileSource(venue);
                let profile_sources: [&dyn InterestSource; 1] = [&profile];
                let profile_tags =
                    aggregate(&profile_sources, &SourceWeights::empty(), &synonyms, &vocab);
                let venue_vec = encode(&profile_tags, &vocab);
                let w = heat_weight(cosine_similarity(&viewer, &venue_vec), &params);
                debug!(venue = venue.name, weight = w, "venue heat weight");
                (venue.id, w)
            })
            .collect();
        let mean_heat_weight =
            venue_weights.values().sum::<f64>() / venue_weights.len().max(1) as f64;

        // --- presence half: tick loop on the virtual clock ----------------

        let compositor = HeatBlobCompositor::default();
        let projection = EquirectangularView {
            center: CITY_CENTER,
            units_per_meter: 0.5,
        };

        let duration_secs = self.config.duration_secs.unwrap_or(spec.duration_secs);
        let lo_ms = self.config.reporter.min_interval.as_millis() as u64;
        let hi_ms = self.config.reporter.max_interval.as_millis() as u64;

        let mut export = SimExport::new(scenario.name(), seed);
        let mut ticks: u64 = 0;
        let mut final_blobs = 0usize;

        while ctx.now().as_secs_f64() < duration_secs {
            // Re-armed single-shot schedule, exactly like the runtime loop
            let jitter_ms = ctx.jitter_ms(lo_ms, hi_ms);
            ctx.advance_time(Duration::from_millis(jitter_ms));

            let t = ctx.now().as_secs_f64();
            provider.set_fix(PresenceSample::new(spec.path.position_at(t), ctx.epoch_ms()));

            let sample = if provider.authorized() {
                provider.latest_sample()
            } else {
                None
            };
            let outcome = reporter.tick(ctx.now(), ctx.epoch_ms(), sample, jitter_ms);
            oracle.record(&outcome, ctx.now(), reporter.gate().is_visible());
            ticks += 1;

            if ticks % self.config.frame_interval_ticks == 0 {
                let groups = world.heat_groups(25.0, 15.0, &|v| venue_weights[&v.id]);
                let overlay = compositor.composite(&groups, &projection);
                final_blobs = overlay.commands.len();

                export.add_frame(SimFrame {
                    time_sec: t,
                    gate_visible: reporter.gate().is_visible(),
                    emissions: oracle.stats().emitted,
                    unique_tiles: oracle.stats().unique_tiles,
                    blobs: final_blobs,
                });
            }
        }

        let stats = oracle.stats().clone();
        info!(
            scenario = scenario.name(),
            seed,
            ticks,
            emitted = stats.emitted,
            tiles = stats.unique_tiles,
            gate_suppressed = stats.suppressed_gate,
            throttled = stats.suppressed_throttle,
            clean = oracle.is_clean(),
            "scenario finished"
        );

        ScenarioResult {
            scenario: scenario.name(),
            seed,
            ticks,
            stats,
            violations: oracle.violations().to_vec(),
            vector_quality,
            mean_heat_weight,
            final_blobs,
            export,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner(seed: u64) -> ScenarioRunner {
        ScenarioRunner::new(SimConfig {
            seed,
            ..SimConfig::default()
        })
    }

    #[test]
    fn test_all_scenarios_pass_the_oracle() {
        for scenario in ScenarioId::all() {
            let result = runner(42).run(scenario);
            assert!(
                result.passed(),
                "{} violated: {:?}",
                result.scenario,
                result.violations
            );
            assert!(result.ticks > 0);
        }
    }

    #[test]
    fn test_city_stroll_emits_across_tiles() {
        let result = runner(42).run(ScenarioId::CityStroll);
        assert!(result.stats.emitted > 0);
        assert!(result.stats.unique_tiles > 1, "a 3km walk crosses tiles");
    }

    #[test]
    fn test_home_orbit_keeps_presence_hidden_near_home() {
        let result = runner(42).run(ScenarioId::HomeOrbit);
        assert!(
            result.stats.suppressed_gate > 0,
            "orbiting the band must hit hidden stretches"
        );
    }

    #[test]
    fn test_burst_revisit_trips_the_throttle() {
        let result = runner(42).run(ScenarioId::BurstRevisit);
        assert!(result.stats.suppressed_throttle > 0);
    }

    #[test]
    fn test_runs_are_seed_deterministic() {
        let a = runner(7).run(ScenarioId::CityStroll);
        let b = runner(7).run(ScenarioId::CityStroll);

        assert_eq!(a.ticks, b.ticks);
        assert_eq!(a.stats, b.stats);
        assert_eq!(a.export.frames.len(), b.export.frames.len());
        assert_eq!(a.mean_heat_weight, b.mean_heat_weight);
    }

    #[test]
    fn test_overlay_renders_venues() {
        let result = runner(42).run(ScenarioId::VenueCrawl);
        // All four venues have >= 3 contributors and real intensity
        assert_eq!(result.final_blobs, 4);
        assert!(result.mean_heat_weight >= HeatWeightParams::default().floor);
        assert!(result.vector_quality >= VectorQuality::Partial);
    }
}
