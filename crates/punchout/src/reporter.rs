//! Error-log reporting.
//!
//! Every entry goes to tracing and to the store's error log. A failing
//! sink is logged and otherwise ignored.

use std::collections::BTreeMap;
use std::sync::Arc;
use storefront_core::{ErrorLogEntry, Severity};
use storefront_store::StorefrontStore;
use tracing::{error, info, warn};

/// Request-scoped key/value payload attached to every entry.
pub type LogContext = BTreeMap<String, String>;

/// Writes structured error-log entries.
#[derive(Clone)]
pub struct ErrorReporter {
    store: Arc<dyn StorefrontStore>,
}

impl ErrorReporter {
    pub fn new(store: Arc<dyn StorefrontStore>) -> Self {
        Self { store }
    }

    pub async fn record(&self, entry: ErrorLogEntry) {
        let context = format!("{:?}", entry.context);
        match entry.severity {
            Severity::Info => info!(
                category = entry.category.as_str(),
                title = %entry.title,
                detail = %entry.detail,
                session_id = entry.session_id.as_deref().unwrap_or(""),
                context = %context,
                "Error log entry"
            ),
            Severity::Warning => warn!(
                category = entry.category.as_str(),
                title = %entry.title,
                detail = %entry.detail,
                session_id = entry.session_id.as_deref().unwrap_or(""),
                context = %context,
                "Error log entry"
            ),
            Severity::Error => error!(
                category = entry.category.as_str(),
                title = %entry.title,
                detail = %entry.detail,
                session_id = entry.session_id.as_deref().unwrap_or(""),
                context = %context,
                "Error log entry"
            ),
        }

        if let Err(e) = self.store.record_error(entry).await {
            error!(error = %e, "Failed to persist error log entry");
        }
    }
}
