//! Structured operational error-log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::error::{Error, ErrorCategory};

/// Entry severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Diagnostic, not a user-facing failure (e.g. catalog-sync gaps)
    Info,
    /// Needs a human to look at it
    Warning,
    Error,
}

/// One persisted error-log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorLogEntry {
    pub id: Uuid,
    pub severity: Severity,
    pub category: ErrorCategory,
    pub title: String,
    pub detail: String,
    pub context: BTreeMap<String, String>,
    pub session_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ErrorLogEntry {
    pub fn new(
        severity: Severity,
        category: ErrorCategory,
        title: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            severity,
            category,
            title: title.into(),
            detail: detail.into(),
            context: BTreeMap::new(),
            session_id: None,
            created_at: Utc::now(),
        }
    }

    /// Builds an entry describing a failed request.
    pub fn from_error(title: impl Into<String>, err: &Error) -> Self {
        let severity = match err.category() {
            ErrorCategory::InternalFailure => Severity::Error,
            _ => Severity::Warning,
        };
        Self::new(severity, err.category(), title, err.to_string())
            .with("error_code", err.error_code())
            .with("http_status", err.http_status().to_string())
    }

    /// Adds a context key/value pair.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Merges a context map, existing keys win.
    pub fn with_context(mut self, context: &BTreeMap<String, String>) -> Self {
        for (k, v) in context {
            self.context.entry(k.clone()).or_insert_with(|| v.clone());
        }
        self
    }

    pub fn with_session(mut self, session_id: Option<&str>) -> Self {
        self.session_id = session_id.map(String::from);
        self
    }
}
