//! Production implementation of EmberContext using Tokio.

use crate::EmberContext;
use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Production context backed by Tokio and OS entropy.
///
/// This is the "real" implementation used in production deployments.
/// Time comes from the system clock, jitter from `ThreadRng`.
pub struct TokioContext {
    /// Start time for monotonic duration calculations
    start: Instant,
}

impl TokioContext {
    /// Creates a new TokioContext.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Creates an Arc-wrapped context for sharing across tasks.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl Default for TokioContext {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmberContext for TokioContext {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    fn epoch_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn spawn<F>(&self, name: &str, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let _name = name.to_string(); // Would be used for tracing
        tokio::spawn(async move {
            future.await;
        });
    }

    fn jitter_ms(&self, lo_ms: u64, hi_ms: u64) -> u64 {
        if lo_ms >= hi_ms {
            return lo_ms;
        }
        rand::thread_rng().gen_range(lo_ms..=hi_ms)
    }

    fn seed(&self) -> u64 {
        // Production is not seeded
        0
    }
}
