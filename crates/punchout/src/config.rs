//! PunchOut configuration.

use serde::{Deserialize, Serialize};
use storefront_core::limits::DEFAULT_SESSION_TTL_MINUTES;

/// Ariba integration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AribaConfig {
    /// Expected shared secret; unset means every setup is rejected
    #[serde(default)]
    pub shared_secret: Option<String>,
    /// PunchOut session lifetime in minutes
    #[serde(default = "default_session_ttl_minutes")]
    pub session_ttl_minutes: i64,
    /// Storefront path that redeems a session id
    #[serde(default = "default_start_page_path")]
    pub start_page_path: String,
}

fn default_session_ttl_minutes() -> i64 {
    DEFAULT_SESSION_TTL_MINUTES
}

fn default_start_page_path() -> String {
    "login/ariba".to_string()
}

impl Default for AribaConfig {
    fn default() -> Self {
        Self {
            shared_secret: None,
            session_ttl_minutes: default_session_ttl_minutes(),
            start_page_path: default_start_page_path(),
        }
    }
}

/// Storefront application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Public base URL of the storefront UI
    #[serde(default = "default_storefront_url")]
    pub storefront_url: String,
}

fn default_storefront_url() -> String {
    "http://localhost:5000".to_string()
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            storefront_url: default_storefront_url(),
        }
    }
}
