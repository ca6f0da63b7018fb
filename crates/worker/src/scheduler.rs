//! Worker scheduler for background tasks.

use std::sync::Arc;
use std::time::Duration;
use storefront_store::StorefrontStore;
use telemetry::health;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::session_sweep::SessionSweepWorker;

/// Worker scheduler configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// How often expired sessions are swept
    pub sweep_interval: Duration,
    /// How long an expired session is kept before deletion
    pub sweep_grace_minutes: i64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(300), // 5 minutes
            sweep_grace_minutes: 60,
        }
    }
}

/// Background worker scheduler.
pub struct WorkerScheduler {
    config: WorkerConfig,
    store: Arc<dyn StorefrontStore>,
}

impl WorkerScheduler {
    pub fn new(config: WorkerConfig, store: Arc<dyn StorefrontStore>) -> Self {
        Self { config, store }
    }

    /// Starts all background workers.
    pub fn start(self: Arc<Self>) -> Vec<tokio::task::JoinHandle<()>> {
        let mut handles = Vec::new();

        let scheduler = self.clone();
        handles.push(tokio::spawn(async move {
            scheduler.run_session_sweep().await;
        }));

        info!(
            sweep_interval_secs = self.config.sweep_interval.as_secs(),
            "Background workers started"
        );
        handles
    }

    async fn run_session_sweep(&self) {
        let worker = SessionSweepWorker::new(self.store.clone(), self.config.sweep_grace_minutes);
        let mut ticker = interval(self.config.sweep_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match worker.run().await {
                Ok(_) => health().session_sweeper.set_healthy(),
                Err(e) => {
                    error!("Session sweep error: {}", e);
                    health().session_sweeper.set_unhealthy(e.to_string());
                }
            }
        }
    }
}
