//! PunchOut session records.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::cxml::Operation;

/// One inbound PunchOut setup, redeemed later for a login.
///
/// Rows are never mutated after creation. Expiry is checked at redemption
/// time; the sweep worker only reclaims space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PunchOutSession {
    /// Random 8-digit decimal id
    #[validate(length(equal = 8))]
    pub session_id: String,
    /// Originating system id (DUNS / NetworkID)
    #[validate(length(min = 1, max = 256))]
    pub from_id: String,
    /// Opaque buyer-side correlation token
    #[validate(length(max = 1024))]
    pub buyer_cookie: String,
    /// Buyer's order-submission endpoint
    #[validate(length(max = 2048))]
    pub post_url: String,
    pub operation: Operation,
    /// User the session logs in as
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl PunchOutSession {
    /// Creates a session expiring `ttl_minutes` after `created_at`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session_id: impl Into<String>,
        from_id: impl Into<String>,
        buyer_cookie: impl Into<String>,
        post_url: impl Into<String>,
        operation: Operation,
        user_id: Uuid,
        created_at: DateTime<Utc>,
        ttl_minutes: i64,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            from_id: from_id.into(),
            buyer_cookie: buyer_cookie.into(),
            post_url: post_url.into(),
            operation,
            user_id,
            created_at,
            expires_at: created_at + Duration::minutes(ttl_minutes),
        }
    }

    /// Checks if the session is past its expiration at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Remaining lifetime at `now` (zero once expired).
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        if self.is_expired(now) {
            Duration::zero()
        } else {
            self.expires_at - now
        }
    }
}
