//! Privacy oracle - replays tick outcomes against the emission contract.
//!
//! The oracle sees every reporter tick together with the gate state and the
//! virtual clock, and checks the three invariants the pipeline exists to
//! uphold:
//!
//! 1. No two emissions for the same tile within the throttle window.
//! 2. No emission while the gate reports hidden.
//! 3. No emission payload ever carries a raw coordinate (tile ids are
//!    integer triples; a decimal point is a smoking gun).
//!
//! Violations carry the seed so any failure reproduces exactly.

use ember_core::reporter::{SuppressReason, TickOutcome};
use ember_env::TileEmission;
use std::collections::HashMap;
use std::time::Duration;

/// Aggregate tick statistics for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OracleStats {
    pub emitted: usize,
    pub suppressed_no_sample: usize,
    pub suppressed_gate: usize,
    pub suppressed_throttle: usize,
    pub unique_tiles: usize,
}

/// Records tick outcomes and checks the privacy invariants.
pub struct PrivacyOracle {
    seed: u64,
    per_tile_min_interval: Duration,
    last_emission: HashMap<String, Duration>,
    stats: OracleStats,
    violations: Vec<String>,
}

impl PrivacyOracle {
    /// Creates an oracle for a run.
    pub fn new(seed: u64, per_tile_min_interval: Duration) -> Self {
        Self {
            seed,
            per_tile_min_interval,
            last_emission: HashMap::new(),
            stats: OracleStats::default(),
            violations: Vec::new(),
        }
    }

    /// Records one tick outcome observed at virtual time `at`.
    ///
    /// `gate_visible` is the gate state *after* the tick consumed its
    /// sample, i.e. the state the emission decision was based on.
    pub fn record(&mut self, outcome: &TickOutcome, at: Duration, gate_visible: bool) {
        match outcome {
            TickOutcome::Emitted(emission) => {
                self.stats.emitted += 1;
                self.check_payload(emission);
                self.check_gate(emission, gate_visible);
                self.check_throttle(emission, at);
                self.last_emission.insert(emission.tile_id.clone(), at);
                self.stats.unique_tiles = self.last_emission.len();
            }
            TickOutcome::Suppressed(SuppressReason::NoSample) => {
                self.stats.suppressed_no_sample += 1;
            }
            TickOutcome::Suppressed(SuppressReason::GateHidden) => {
                self.stats.suppressed_gate += 1;
            }
            TickOutcome::Suppressed(SuppressReason::Throttled(_)) => {
                self.stats.suppressed_throttle += 1;
            }
        }
    }

    fn check_payload(&mut self, emission: &TileEmission) {
        let well_formed = {
            let mut parts = emission.tile_id.split(':');
            let res = parts.next().map(|p| p.parse::<u32>().is_ok());
            let x = parts.next().map(|p| p.parse::<i64>().is_ok());
            let y = parts.next().map(|p| p.parse::<i64>().is_ok());
            parts.next().is_none()
                && res == Some(true)
                && x == Some(true)
                && y == Some(true)
        };

        if !well_formed || emission.tile_id.contains('.') {
            self.violations.push(format!(
                "seed {}: emission payload is not a bare tile id: {:?}",
                self.seed, emission.tile_id
            ));
        }
    }

    fn check_gate(&mut self, emission: &TileEmission, gate_visible: bool) {
        if !gate_visible {
            self.violations.push(format!(
                "seed {}: emitted tile {} while gate hidden",
                self.seed, emission.tile_id
            ));
        }
    }

    fn check_throttle(&mut self, emission: &TileEmission, at: Duration) {
        if let Some(last) = self.last_emission.get(&emission.tile_id) {
            let gap = at.saturating_sub(*last);
            if gap < self.per_tile_min_interval {
                self.violations.push(format!(
                    "seed {}: tile {} re-emitted after {:?} (< {:?})",
                    self.seed, emission.tile_id, gap, self.per_tile_min_interval
                ));
            }
        }
    }

    /// Run statistics so far.
    pub fn stats(&self) -> &OracleStats {
        &self.stats
    }

    /// True when no invariant was violated.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// All recorded violations.
    pub fn violations(&self) -> &[String] {
        &self.violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emission(tile_id: &str) -> TickOutcome {
        TickOutcome::Emitted(TileEmission {
            tile_id: tile_id.to_string(),
            epoch_ms: 0,
            jitter_ms: 0,
        })
    }

    fn oracle() -> PrivacyOracle {
        PrivacyOracle::new(42, Duration::from_secs(60))
    }

    #[test]
    fn test_clean_run() {
        let mut o = oracle();
        o.record(&emission("250:100:200"), Duration::from_secs(10), true);
        o.record(&emission("250:101:200"), Duration::from_secs(20), true);
        o.record(&emission("250:100:200"), Duration::from_secs(90), true);

        assert!(o.is_clean(), "{:?}", o.violations());
        assert_eq!(o.stats().emitted, 3);
        assert_eq!(o.stats().unique_tiles, 2);
    }

    #[test]
    fn test_throttle_violation_detected() {
        let mut o = oracle();
        o.record(&emission("250:100:200"), Duration::from_secs(10), true);
        o.record(&emission("250:100:200"), Duration::from_secs(30), true);

        assert!(!o.is_clean());
        assert!(o.violations()[0].contains("re-emitted"));
    }

    #[test]
    fn test_gate_violation_detected() {
        let mut o = oracle();
        o.record(&emission("250:100:200"), Duration::from_secs(10), false);

        assert!(!o.is_clean());
        assert!(o.violations()[0].contains("gate hidden"));
    }

    #[test]
    fn test_coordinate_smuggling_detected() {
        let mut o = oracle();
        o.record(&emission("37.7749:-122.4194"), Duration::from_secs(10), true);

        assert!(!o.is_clean());
    }

    #[test]
    fn test_suppressions_counted_not_flagged() {
        let mut o = oracle();
        o.record(
            &TickOutcome::Suppressed(SuppressReason::NoSample),
            Duration::from_secs(1),
            true,
        );
        o.record(
            &TickOutcome::Suppressed(SuppressReason::GateHidden),
            Duration::from_secs(2),
            false,
        );

        assert!(o.is_clean());
        assert_eq!(o.stats().suppressed_no_sample, 1);
        assert_eq!(o.stats().suppressed_gate, 1);
        assert_eq!(o.stats().emitted, 0);
    }
}
