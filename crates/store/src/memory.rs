//! In-memory store.
//!
//! All tables sit behind a single `RwLock`, so every trait method is one
//! critical section and `commit_setup` is atomic.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use storefront_core::taxonomy::{MergeSummary, Taxonomy};
use storefront_core::{
    ApplicationUser, ContractItem, Error, ErrorLogEntry, NewCartItem, PunchOutSession, Result,
    ShoppingCart, ShoppingCartItem,
};
use tracing::debug;
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::store::{SetupCommit, StorefrontStore};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, ApplicationUser>,
    carts: HashMap<Uuid, ShoppingCart>,
    cart_items: Vec<ShoppingCartItem>,
    contract_items: Vec<ContractItem>,
    sessions: HashMap<String, PunchOutSession>,
    error_log: VecDeque<ErrorLogEntry>,
    taxonomy: Taxonomy,
}

impl Tables {
    fn replace_cart_items(&mut self, cart_id: Uuid, items: Vec<NewCartItem>) -> Result<usize> {
        if !self.carts.contains_key(&cart_id) {
            return Err(Error::database(format!("cart {} does not exist", cart_id)));
        }

        self.cart_items.retain(|item| item.cart_id != cart_id);

        let now = Utc::now();
        let count = items.len();
        self.cart_items
            .extend(items.into_iter().map(|item| item.into_item(now)));
        Ok(count)
    }

    fn ensure_session_id_free(&self, session_id: &str) -> Result<()> {
        if self.sessions.contains_key(session_id) {
            return Err(Error::conflict(format!(
                "PunchOut session {} already exists",
                session_id
            )));
        }
        Ok(())
    }
}

/// In-memory implementation of [`StorefrontStore`].
pub struct MemoryStore {
    tables: RwLock<Tables>,
    error_log_capacity: usize,
}

impl MemoryStore {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            error_log_capacity: config.error_log_capacity.max(1),
        }
    }

    pub fn insert_user(&self, user: ApplicationUser) {
        self.tables.write().users.insert(user.id, user);
    }

    pub fn insert_cart(&self, cart: ShoppingCart) {
        self.tables.write().carts.insert(cart.id, cart);
    }

    pub fn insert_contract_item(&self, item: ContractItem) {
        self.tables.write().contract_items.push(item);
    }

    pub fn merge_taxonomy(&self, taxonomy: Taxonomy) -> MergeSummary {
        self.tables.write().taxonomy.merge(taxonomy)
    }

    /// Adds a line to a cart without touching its other lines.
    pub fn insert_cart_item(&self, item: ShoppingCartItem) {
        self.tables.write().cart_items.push(item);
    }

    /// Snapshot of the error log, oldest first.
    pub fn error_log(&self) -> Vec<ErrorLogEntry> {
        self.tables.read().error_log.iter().cloned().collect()
    }

    pub fn session_count(&self) -> usize {
        self.tables.read().sessions.len()
    }

    pub fn user_count(&self) -> usize {
        self.tables.read().users.len()
    }

    pub fn contract_item_count(&self) -> usize {
        self.tables.read().contract_items.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(&StoreConfig::default())
    }
}

#[async_trait]
impl StorefrontStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<ApplicationUser>> {
        Ok(self
            .tables
            .read()
            .users
            .values()
            .find(|u| u.has_email(email))
            .cloned())
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<ApplicationUser>> {
        Ok(self.tables.read().users.get(&user_id).cloned())
    }

    async fn find_cart_for_user(&self, user_id: Uuid) -> Result<Option<ShoppingCart>> {
        Ok(self
            .tables
            .read()
            .carts
            .values()
            .find(|c| c.user_id == user_id)
            .cloned())
    }

    async fn cart_items(&self, cart_id: Uuid) -> Result<Vec<ShoppingCartItem>> {
        Ok(self
            .tables
            .read()
            .cart_items
            .iter()
            .filter(|i| i.cart_id == cart_id)
            .cloned()
            .collect())
    }

    async fn find_contract_item(
        &self,
        client_id: Uuid,
        customer_stock_number: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ContractItem>> {
        Ok(self
            .tables
            .read()
            .contract_items
            .iter()
            .find(|item| {
                item.client_id == client_id
                    && item.is_current(now)
                    && item.matches_stock_number(customer_stock_number)
            })
            .cloned())
    }

    async fn find_session(&self, session_id: &str) -> Result<Option<PunchOutSession>> {
        Ok(self.tables.read().sessions.get(session_id).cloned())
    }

    async fn create_session(&self, session: PunchOutSession) -> Result<()> {
        let mut tables = self.tables.write();
        tables.ensure_session_id_free(&session.session_id)?;
        tables.sessions.insert(session.session_id.clone(), session);
        Ok(())
    }

    async fn commit_setup(&self, commit: SetupCommit) -> Result<()> {
        let mut tables = self.tables.write();

        // Validate everything before the first mutation.
        tables.ensure_session_id_free(&commit.session.session_id)?;
        if let Some(ref replacement) = commit.cart_replacement {
            if !tables.carts.contains_key(&replacement.cart_id) {
                return Err(Error::database(format!(
                    "cart {} does not exist",
                    replacement.cart_id
                )));
            }
        }

        if let Some(replacement) = commit.cart_replacement {
            let written = tables.replace_cart_items(replacement.cart_id, replacement.items)?;
            debug!(cart_id = %replacement.cart_id, items = written, "Replaced cart contents");
        }

        tables
            .sessions
            .insert(commit.session.session_id.clone(), commit.session);
        Ok(())
    }

    async fn delete_sessions_expired_before(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut tables = self.tables.write();
        let before = tables.sessions.len();
        tables.sessions.retain(|_, s| s.expires_at >= cutoff);
        Ok(before - tables.sessions.len())
    }

    async fn record_error(&self, entry: ErrorLogEntry) -> Result<()> {
        let mut tables = self.tables.write();
        while tables.error_log.len() >= self.error_log_capacity {
            tables.error_log.pop_front();
        }
        tables.error_log.push_back(entry);
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let _tables = self.tables.read();
        Ok(())
    }
}
