//! Ariba PunchOut (cXML) setup handling.
//!
//! Flow: raw body → [`document::parse_document`] → [`credentials`] checks →
//! [`reconcile`] (edit/inspect only) → [`session`] allocation → atomic store
//! commit → [`compose`] response. [`setup::PunchOutService`] drives it.

pub mod compose;
pub mod config;
pub mod credentials;
pub mod document;
pub mod reconcile;
pub mod reporter;
pub mod session;
pub mod setup;

pub use compose::ResponseComposer;
pub use config::*;
pub use reporter::{ErrorReporter, LogContext};
pub use setup::{PunchOutService, SetupOutcome, SetupStage};
