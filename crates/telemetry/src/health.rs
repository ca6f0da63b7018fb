//! Health check aggregation.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

/// Health status for the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }

    pub fn is_serving(&self) -> bool {
        matches!(self, Self::Healthy | Self::Degraded)
    }
}

/// Health flag for one component.
#[derive(Debug)]
pub struct ComponentHealth {
    name: &'static str,
    /// Whether readiness depends on this component
    critical: bool,
    healthy: AtomicBool,
    message: parking_lot::RwLock<Option<String>>,
}

impl ComponentHealth {
    pub const fn new(name: &'static str, critical: bool) -> Self {
        Self {
            name,
            critical,
            healthy: AtomicBool::new(false),
            message: parking_lot::RwLock::new(None),
        }
    }

    pub fn set_healthy(&self) {
        self.healthy.store(true, Ordering::Relaxed);
        *self.message.write() = None;
    }

    pub fn set_unhealthy(&self, msg: impl Into<String>) {
        self.healthy.store(false, Ordering::Relaxed);
        *self.message.write() = Some(msg.into());
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn message(&self) -> Option<String> {
        self.message.read().clone()
    }

    fn report(&self) -> ComponentHealthReport {
        ComponentHealthReport {
            name: self.name.to_string(),
            healthy: self.is_healthy(),
            critical: self.critical,
            message: self.message(),
        }
    }
}

/// Aggregated health status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub components: Vec<ComponentHealthReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealthReport {
    pub name: String,
    pub healthy: bool,
    pub critical: bool,
    pub message: Option<String>,
}

/// Health of the storefront's moving parts.
pub struct HealthRegistry {
    /// The persistence backend
    pub store: ComponentHealth,
    /// The expired-session sweep worker
    pub session_sweeper: ComponentHealth,
}

impl HealthRegistry {
    pub const fn new() -> Self {
        Self {
            store: ComponentHealth::new("store", true),
            session_sweeper: ComponentHealth::new("session_sweeper", false),
        }
    }

    fn components(&self) -> [&ComponentHealth; 2] {
        [&self.store, &self.session_sweeper]
    }

    /// Unhealthy if a critical component is down, degraded if any other is.
    pub fn report(&self) -> HealthReport {
        let components: Vec<_> = self.components().iter().map(|c| c.report()).collect();

        let status = if components.iter().any(|c| c.critical && !c.healthy) {
            HealthStatus::Unhealthy
        } else if components.iter().any(|c| !c.healthy) {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        HealthReport { status, components }
    }

    /// Whether the service can accept PunchOut traffic.
    pub fn is_ready(&self) -> bool {
        self.components()
            .iter()
            .filter(|c| c.critical)
            .all(|c| c.is_healthy())
    }

    pub fn is_alive(&self) -> bool {
        true
    }
}

impl Default for HealthRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global health registry.
pub static HEALTH: std::sync::LazyLock<HealthRegistry> =
    std::sync::LazyLock::new(HealthRegistry::new);

/// Get the global health registry.
pub fn health() -> &'static HealthRegistry {
    &HEALTH
}
