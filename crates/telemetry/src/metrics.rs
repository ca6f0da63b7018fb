//! In-process metrics.
//!
//! Plain atomics, read through [`Metrics::snapshot`] by the health endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A monotonically increasing counter.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// A value that can go up or down.
#[derive(Debug, Default)]
pub struct Gauge(AtomicU64);

impl Gauge {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn set(&self, val: u64) {
        self.0.store(val, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Latency histogram with fixed millisecond buckets.
#[derive(Debug)]
pub struct Histogram {
    /// Buckets: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 5s
    buckets: [AtomicU64; 10],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 10] = [1, 5, 10, 25, 50, 100, 250, 500, 1000, 5000];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Records a value in milliseconds.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        let idx = Self::BUCKET_BOUNDS
            .iter()
            .position(|&bound| ms <= bound)
            .unwrap_or(Self::BUCKET_BOUNDS.len() - 1);
        self.buckets[idx].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum() as f64 / count as f64
        }
    }

    /// (upper bound, count) pairs.
    pub fn buckets(&self) -> Vec<(u64, u64)> {
        Self::BUCKET_BOUNDS
            .iter()
            .zip(self.buckets.iter())
            .map(|(&bound, count)| (bound, count.load(Ordering::Relaxed)))
            .collect()
    }
}

/// Storefront metrics.
#[derive(Debug, Default)]
pub struct Metrics {
    // Setup flow
    pub setup_requests: Counter,
    pub setup_succeeded: Counter,
    pub setup_failed: Counter,
    pub setup_latency_ms: Histogram,

    // Cart reconciliation
    pub items_reconciled: Counter,
    pub items_skipped: Counter,
    pub items_unmatched: Counter,
    pub price_mismatches: Counter,
    pub carts_cleared_empty: Counter,

    // Sessions
    pub sessions_created: Counter,
    pub sessions_redeemed: Counter,
    pub sessions_expired: Counter,
    pub sessions_swept: Counter,
    pub tokens_issued: Counter,

    // Gauges
    pub last_sweep_unix: Gauge,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            setup_requests: self.setup_requests.get(),
            setup_succeeded: self.setup_succeeded.get(),
            setup_failed: self.setup_failed.get(),
            setup_latency_mean_ms: self.setup_latency_ms.mean(),
            items_reconciled: self.items_reconciled.get(),
            items_skipped: self.items_skipped.get(),
            items_unmatched: self.items_unmatched.get(),
            price_mismatches: self.price_mismatches.get(),
            carts_cleared_empty: self.carts_cleared_empty.get(),
            sessions_created: self.sessions_created.get(),
            sessions_redeemed: self.sessions_redeemed.get(),
            sessions_expired: self.sessions_expired.get(),
            sessions_swept: self.sessions_swept.get(),
            tokens_issued: self.tokens_issued.get(),
            last_sweep_unix: self.last_sweep_unix.get(),
        }
    }
}

/// Point-in-time view of [`Metrics`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub setup_requests: u64,
    pub setup_succeeded: u64,
    pub setup_failed: u64,
    pub setup_latency_mean_ms: f64,
    pub items_reconciled: u64,
    pub items_skipped: u64,
    pub items_unmatched: u64,
    pub price_mismatches: u64,
    pub carts_cleared_empty: u64,
    pub sessions_created: u64,
    pub sessions_redeemed: u64,
    pub sessions_expired: u64,
    pub sessions_swept: u64,
    pub tokens_issued: u64,
    pub last_sweep_unix: u64,
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
