//! Process-wide telemetry for the PunchOut storefront.
//!
//! Counters and health flags live in statics so handlers, workers, and the
//! health endpoints share them without threading state around.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;
