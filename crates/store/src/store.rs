//! The persistence seam.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use storefront_core::{
    ApplicationUser, ContractItem, ErrorLogEntry, NewCartItem, PunchOutSession, Result,
    ShoppingCart, ShoppingCartItem,
};
use uuid::Uuid;

/// Replacement contents for one cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartReplacement {
    pub cart_id: Uuid,
    pub items: Vec<NewCartItem>,
}

/// Everything a PunchOut setup writes, applied as one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct SetupCommit {
    pub session: PunchOutSession,
    pub cart_replacement: Option<CartReplacement>,
}

/// Storage used by the PunchOut flow and the login bridge.
///
/// Implemented by [`crate::MemoryStore`] in production and wrapped by
/// failure-injecting doubles in tests.
#[async_trait]
pub trait StorefrontStore: Send + Sync {
    /// Finds a user by email (case-insensitive).
    async fn find_user_by_email(&self, email: &str) -> Result<Option<ApplicationUser>>;

    async fn find_user(&self, user_id: Uuid) -> Result<Option<ApplicationUser>>;

    async fn find_cart_for_user(&self, user_id: Uuid) -> Result<Option<ShoppingCart>>;

    async fn cart_items(&self, cart_id: Uuid) -> Result<Vec<ShoppingCartItem>>;

    /// Finds a contract item of `client_id` whose customer stock number
    /// matches case-insensitively and which is current at `now`.
    async fn find_contract_item(
        &self,
        client_id: Uuid,
        customer_stock_number: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ContractItem>>;

    async fn find_session(&self, session_id: &str) -> Result<Option<PunchOutSession>>;

    /// Inserts a session; fails with a conflict if the id exists.
    async fn create_session(&self, session: PunchOutSession) -> Result<()>;

    /// Applies a setup's session insert and optional cart replacement
    /// atomically. A session-id conflict leaves the cart untouched.
    async fn commit_setup(&self, commit: SetupCommit) -> Result<()>;

    /// Deletes sessions that expired before `cutoff`; returns the count.
    async fn delete_sessions_expired_before(&self, cutoff: DateTime<Utc>) -> Result<usize>;

    async fn record_error(&self, entry: ErrorLogEntry) -> Result<()>;

    /// Cheap liveness probe.
    async fn ping(&self) -> Result<()>;
}
