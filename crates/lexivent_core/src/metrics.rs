//! Performance metrics collection for the simulation.
//!
//! Provides structured logging and metrics tracking for monitoring
//! simulation performance and health.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// How often `record_tick` emits a progress line.
const LOG_INTERVAL: u64 = 100;

/// Metrics collector for simulation statistics.
pub struct Metrics {
    tick_count: AtomicU64,
    token_count: AtomicU64,
    chain_count: AtomicU64,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Creates a new metrics collector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tick_count: AtomicU64::new(0),
            token_count: AtomicU64::new(0),
            chain_count: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Records a completed tick with its duration.
    pub fn record_tick(&self, duration: Duration, tokens: usize, chains: usize) {
        self.tick_count.fetch_add(1, Ordering::Relaxed);
        self.token_count.store(tokens as u64, Ordering::Relaxed);
        self.chain_count.store(chains as u64, Ordering::Relaxed);

        let tick = self.tick_count.load(Ordering::Relaxed);
        if tick % LOG_INTERVAL == 0 {
            tracing::info!(
                tick = tick,
                tokens = tokens,
                chains = chains,
                duration_us = duration.as_micros() as u64,
                "simulation tick"
            );
        }
    }

    /// Gets the current tick count.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    /// Gets the current token count.
    #[must_use]
    pub fn token_count(&self) -> u64 {
        self.token_count.load(Ordering::Relaxed)
    }

    /// Gets elapsed time since metrics creation.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Initialize tracing subscriber for logging. Honors `RUST_LOG`, defaulting
/// to `info`.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = Metrics::new();
        assert_eq!(metrics.tick_count(), 0);
        assert_eq!(metrics.token_count(), 0);
    }

    #[test]
    fn test_record_tick() {
        let metrics = Metrics::new();
        metrics.record_tick(Duration::from_micros(250), 42, 3);
        metrics.record_tick(Duration::from_micros(300), 43, 4);
        assert_eq!(metrics.tick_count(), 2);
        assert_eq!(metrics.token_count(), 43);
    }

    #[test]
    fn test_elapsed_advances() {
        let metrics = Metrics::new();
        std::thread::sleep(Duration::from_millis(1));
        assert!(metrics.elapsed() > Duration::ZERO);
    }
}
