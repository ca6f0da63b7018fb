//! Background workers for the PunchOut storefront.
//!
//! Currently a single job: sweeping expired PunchOut sessions.

pub mod scheduler;
pub mod session_sweep;

pub use scheduler::*;
pub use session_sweep::SessionSweepWorker;
