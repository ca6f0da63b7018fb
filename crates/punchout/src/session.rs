//! Session id allocation and redemption.

use chrono::{DateTime, Utc};
use rand::Rng;
use storefront_core::limits::SESSION_ID_MAX_ATTEMPTS;
use storefront_core::{
    ApplicationUser, AuthErrorCode, Error, PunchOutSession, ResourceErrorCode, Result,
};
use storefront_store::StorefrontStore;
use telemetry::metrics;
use tracing::{debug, warn};

const SESSION_ID_MIN: u32 = 10_000_000;
const SESSION_ID_MAX: u32 = 100_000_000;

/// Draws a random 8-digit decimal id (no leading zero).
pub fn generate_session_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    rng.gen_range(SESSION_ID_MIN..SESSION_ID_MAX).to_string()
}

/// Picks an id not currently in use.
///
/// The check is advisory: the insert at commit time is the authority, and a
/// collision there surfaces as a conflict.
pub async fn allocate_session_id(store: &dyn StorefrontStore) -> Result<String> {
    for attempt in 1..=SESSION_ID_MAX_ATTEMPTS {
        let candidate = generate_session_id(&mut rand::thread_rng());
        if store.find_session(&candidate).await?.is_none() {
            return Ok(candidate);
        }
        debug!(attempt, "Session id collision, drawing again");
    }

    Err(Error::internal(format!(
        "Could not allocate a free session id after {} attempts",
        SESSION_ID_MAX_ATTEMPTS
    )))
}

/// Resolves a session id into the session and the user it logs in as.
///
/// Expired sessions are refused but not deleted; the sweep reclaims them.
pub async fn redeem_session(
    store: &dyn StorefrontStore,
    session_id: &str,
    now: DateTime<Utc>,
) -> Result<(PunchOutSession, ApplicationUser)> {
    let session_id = session_id.trim();
    let session = store.find_session(session_id).await?.ok_or_else(|| {
        Error::resource(
            ResourceErrorCode::SessionNotFound,
            format!("PunchOut session {} not found", session_id),
        )
    })?;

    if session.is_expired(now) {
        metrics().sessions_expired.inc();
        warn!(
            session_id = %session.session_id,
            expired_at = %session.expires_at,
            "Rejected expired PunchOut session"
        );
        return Err(Error::auth(
            AuthErrorCode::SessionExpired,
            "PunchOut session has expired",
        ));
    }

    let user = store.find_user(session.user_id).await?.ok_or_else(|| {
        Error::auth(
            AuthErrorCode::SessionUserMissing,
            "PunchOut session user no longer exists",
        )
    })?;

    metrics().sessions_redeemed.inc();
    Ok((session, user))
}
