//! Shared helpers for the end-to-end HTTP tests.

pub mod fixtures;
pub mod setup;
