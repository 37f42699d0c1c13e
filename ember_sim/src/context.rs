//! Simulation context implementing EmberContext for deterministic testing.

use async_trait::async_trait;
use ember_env::EmberContext;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Virtual time 0 maps to 2024-01-01 00:00:00 UTC.
const EPOCH_MS: u64 = 1_704_067_200_000;

/// Simulation context backed by deterministic time and RNG.
///
/// This implements `EmberContext` using:
/// - A virtual clock that can be advanced manually
/// - A seeded ChaCha8 RNG for reproducible scheduling jitter
/// - Simulated sleep that advances virtual time
pub struct SimContext {
    /// Master seed for this simulation
    seed: u64,

    /// Current virtual time (nanoseconds since simulation start)
    virtual_time_ns: Arc<Mutex<u64>>,

    /// Deterministic RNG for jitter draws
    rng: Arc<Mutex<ChaCha8Rng>>,
}

impl SimContext {
    /// Creates a new SimContext with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            virtual_time_ns: Arc::new(Mutex::new(0)),
            rng: Arc::new(Mutex::new(ChaCha8Rng::seed_from_u64(seed))),
        }
    }

    /// Creates an Arc-wrapped context for sharing.
    pub fn shared(seed: u64) -> Arc<Self> {
        Arc::new(Self::new(seed))
    }

    /// Advances virtual time by the given duration.
    pub fn advance_time(&self, duration: Duration) {
        let mut time = self.virtual_time_ns.lock().unwrap();
        *time += duration.as_nanos() as u64;
    }
}

#[async_trait]
impl EmberContext for SimContext {
    fn now(&self) -> Duration {
        Duration::from_nanos(*self.virtual_time_ns.lock().unwrap())
    }

    fn epoch_ms(&self) -> u64 {
        EPOCH_MS + self.now().as_millis() as u64
    }

    async fn sleep(&self, duration: Duration) {
        // Virtual sleep: advancing the clock is the whole effect
        self.advance_time(duration);
    }

    fn spawn<F>(&self, name: &str, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let _name = name.to_string();
        tokio::spawn(future);
    }

    fn jitter_ms(&self, lo_ms: u64, hi_ms: u64) -> u64 {
        if lo_ms >= hi_ms {
            return lo_ms;
        }
        self.rng.lock().unwrap().gen_range(lo_ms..=hi_ms)
    }

    fn seed(&self) -> u64 {
        self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_clock_advances() {
        let ctx = SimContext::new(42);
        assert_eq!(ctx.now(), Duration::ZERO);

        ctx.advance_time(Duration::from_secs(30));
        assert_eq!(ctx.now(), Duration::from_secs(30));
        assert_eq!(ctx.epoch_ms(), EPOCH_MS + 30_000);
    }

    #[test]
    fn test_jitter_is_seeded() {
        let a = SimContext::new(7);
        let b = SimContext::new(7);
        let draws_a: Vec<u64> = (0..16).map(|_| a.jitter_ms(15_000, 45_000)).collect();
        let draws_b: Vec<u64> = (0..16).map(|_| b.jitter_ms(15_000, 45_000)).collect();

        assert_eq!(draws_a, draws_b, "same seed must reproduce jitter");
        assert!(draws_a.iter().all(|j| (15_000..=45_000).contains(j)));
    }

    #[test]
    fn test_different_seeds_diverge() {
        let a = SimContext::new(1);
        let b = SimContext::new(2);
        let draws_a: Vec<u64> = (0..16).map(|_| a.jitter_ms(0, 1_000_000)).collect();
        let draws_b: Vec<u64> = (0..16).map(|_| b.jitter_ms(0, 1_000_000)).collect();
        assert_ne!(draws_a, draws_b);
    }

    #[tokio::test]
    async fn test_sleep_advances_virtual_time() {
        let ctx = SimContext::new(42);
        ctx.sleep(Duration::from_secs(60)).await;
        assert_eq!(ctx.now(), Duration::from_secs(60));
    }

    proptest::proptest! {
        #[test]
        fn prop_jitter_stays_in_bounds(seed: u64, lo in 0u64..100_000, span in 0u64..100_000) {
            let ctx = SimContext::new(seed);
            let hi = lo + span;
            for _ in 0..8 {
                let j = ctx.jitter_ms(lo, hi);
                proptest::prop_assert!((lo..=hi).contains(&j));
            }
        }
    }
}
