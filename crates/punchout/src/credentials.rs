//! Sender and user authentication for PunchOut setup requests.
//!
//! Checks run in a fixed order and the first failure wins:
//! 1. header present
//! 2. `From` identity in a DUNS/NetworkID domain
//! 3. `Sender` credential carrying a shared secret
//! 4. Ariba user identity (first `From` identity)
//! 5. shared secret equals the configured one
//! 6. `UserEmail` extrinsic resolves to a user
//! 7. that user's stored Ariba id equals step 4's value

use storefront_core::cxml::{Credential, PunchOutSetupRequest};
use storefront_core::limits::{SENDER_DOMAINS, SHARED_SECRET_DOMAINS, USER_EMAIL_EXTRINSIC};
use storefront_core::{ApplicationUser, AuthErrorCode, Cxml, Error, InputErrorCode, Result};
use storefront_store::StorefrontStore;

/// Identity claims extracted from the cXML header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderIdentity {
    /// Originating system id (DUNS / NetworkID)
    pub from_id: String,
    pub shared_secret: String,
    /// Raw value of the first `From` identity
    pub ariba_user_id: String,
}

/// Steps 1-4: pulls the sender identity, secret, and Ariba user id.
pub fn extract_sender(doc: &Cxml) -> Result<SenderIdentity> {
    let header = doc.header.as_ref().ok_or_else(|| {
        Error::input(InputErrorCode::MissingHeader, "cXML Header is missing")
    })?;

    let from_id = header
        .from
        .credentials
        .iter()
        .find(|c| in_domains(c, SENDER_DOMAINS))
        .and_then(Credential::identity)
        .ok_or_else(|| {
            Error::input(
                InputErrorCode::MissingSender,
                "No DUNS or NetworkID identity in From",
            )
        })?;

    let shared_secret = header
        .sender
        .credentials
        .iter()
        .find(|c| in_domains(c, SHARED_SECRET_DOMAINS) && c.shared_secret.is_some())
        .and_then(Credential::shared_secret)
        .ok_or_else(|| {
            Error::input(
                InputErrorCode::MissingCredential,
                "No NetworkId/AribaNetworkUserId SharedSecret credential in Sender",
            )
        })?;

    let ariba_user_id = header
        .from
        .credentials
        .first()
        .and_then(Credential::identity)
        .ok_or_else(|| {
            Error::input(
                InputErrorCode::MissingUserIdentity,
                "No Ariba user identity in From",
            )
        })?;

    Ok(SenderIdentity {
        from_id: from_id.to_string(),
        shared_secret: shared_secret.to_string(),
        ariba_user_id: ariba_user_id.to_string(),
    })
}

/// Step 5: exact comparison against the configured secret.
pub fn verify_shared_secret(expected: Option<&str>, supplied: &str) -> Result<()> {
    let Some(expected) = expected.filter(|s| !s.is_empty()) else {
        return Err(Error::auth(
            AuthErrorCode::SecretNotConfigured,
            "Shared secret is not configured",
        ));
    };

    if supplied.is_empty() {
        return Err(Error::auth(AuthErrorCode::SecretMissing, "Shared secret is missing"));
    }

    if supplied != expected {
        return Err(Error::auth(AuthErrorCode::SecretMismatch, "Invalid shared secret"));
    }

    Ok(())
}

/// Step 6a: the buyer-supplied `UserEmail` extrinsic.
pub fn extract_user_email(request: &PunchOutSetupRequest) -> Result<&str> {
    request.extrinsic(USER_EMAIL_EXTRINSIC).ok_or_else(|| {
        Error::input(
            InputErrorCode::MissingEmail,
            "UserEmail extrinsic is missing",
        )
    })
}

/// Step 6b: resolves the application user by email.
pub async fn resolve_user(store: &dyn StorefrontStore, email: &str) -> Result<ApplicationUser> {
    store.find_user_by_email(email).await?.ok_or_else(|| {
        Error::input(
            InputErrorCode::UnknownUser,
            format!("No user found for email {}", email),
        )
    })
}

/// Step 7: the user's stored Ariba id must equal the header's.
pub fn verify_identity_binding(user: &ApplicationUser, ariba_user_id: &str) -> Result<()> {
    if !user.is_bound_to(ariba_user_id) {
        return Err(Error::auth(
            AuthErrorCode::IdentityMismatch,
            "Ariba identity is not bound to this user",
        ));
    }
    Ok(())
}

fn in_domains(credential: &Credential, domains: &[&str]) -> bool {
    domains.iter().any(|d| credential.has_domain(d))
}
