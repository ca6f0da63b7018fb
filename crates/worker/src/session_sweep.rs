//! Expired PunchOut session cleanup.
//!
//! Redemption checks expiry on its own; this only reclaims rows. A grace
//! period keeps recently expired sessions around so a late redemption still
//! gets a 401 rather than a 400.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use storefront_core::Result;
use storefront_store::StorefrontStore;
use telemetry::metrics;
use tracing::{debug, info};

/// Deletes sessions that expired more than `grace` ago.
pub struct SessionSweepWorker {
    store: Arc<dyn StorefrontStore>,
    grace: Duration,
}

impl SessionSweepWorker {
    pub fn new(store: Arc<dyn StorefrontStore>, grace_minutes: i64) -> Self {
        Self {
            store,
            grace: Duration::minutes(grace_minutes.max(0)),
        }
    }

    /// Oldest expiry that survives a sweep at `now`.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.grace
    }

    /// Runs one sweep; returns the number of sessions removed.
    pub async fn run(&self) -> Result<usize> {
        self.run_at(Utc::now()).await
    }

    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<usize> {
        let cutoff = self.cutoff(now);
        let removed = self.store.delete_sessions_expired_before(cutoff).await?;

        let m = metrics();
        m.sessions_swept.inc_by(removed as u64);
        m.last_sweep_unix.set(now.timestamp().max(0) as u64);

        if removed > 0 {
            info!(removed, cutoff = %cutoff, "Swept expired PunchOut sessions");
        } else {
            debug!(cutoff = %cutoff, "No expired PunchOut sessions to sweep");
        }
        Ok(removed)
    }
}
