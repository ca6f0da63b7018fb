//! Persistence for the PunchOut storefront.
//!
//! Everything above this crate talks to [`StorefrontStore`]; the in-memory
//! [`MemoryStore`] backs the service and the test suite.

pub mod config;
pub mod health;
pub mod memory;
pub mod seed;
pub mod store;

pub use config::*;
pub use memory::MemoryStore;
pub use seed::{SeedData, SeedSummary};
pub use store::*;
