//! Application users.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A storefront user, possibly bound to an Ariba identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ApplicationUser {
    pub id: Uuid,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub client_id: Option<Uuid>,
    /// Ariba identity bound at provisioning time
    #[serde(default)]
    pub ariba_id: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl ApplicationUser {
    /// Case-insensitive email comparison.
    pub fn has_email(&self, email: &str) -> bool {
        self.email.trim().eq_ignore_ascii_case(email.trim())
    }

    /// Exact comparison against the bound Ariba identity.
    ///
    /// A user without a binding never matches.
    pub fn is_bound_to(&self, ariba_id: &str) -> bool {
        self.ariba_id.as_deref() == Some(ariba_id)
    }
}
