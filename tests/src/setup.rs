//! Common test setup functions.

use api::{router, AppState, JwtConfig};
use axum::Router;
use chrono::{DateTime, Utc};
use punchout::{AppSettings, AribaConfig};
use rust_decimal::Decimal;
use std::sync::Arc;
use storefront_core::{
    ApplicationUser, ContractItem, ErrorLogEntry, Operation, PunchOutSession, ShoppingCart,
    ShoppingCartItem,
};
use storefront_store::{MemoryStore, StorefrontStore};
use uuid::Uuid;

use crate::fixtures::{ARIBA_USER_ID, JWT_KEY, SENDER_DUNS, SHARED_SECRET, STOREFRONT_URL, USER_EMAIL};
use crate::mocks::{Faults, FlakyStore};

/// Ids of the seeded records.
#[derive(Debug, Clone, Copy)]
pub struct Seeded {
    pub client_id: Uuid,
    pub user_id: Uuid,
    pub cart_id: Uuid,
    /// Contract item `ABC123`, priced 10.00
    pub abc123_id: Uuid,
    /// A user with no cart
    pub cartless_user_id: Uuid,
}

/// Test context backed by the real router and an in-memory store.
///
/// The store is wrapped in [`FlakyStore`] so individual tests can inject
/// failures without a different code path.
pub struct TestContext {
    pub store: Arc<FlakyStore>,
    pub router: Router,
    pub seeded: Seeded,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_ariba(AribaConfig {
            shared_secret: Some(SHARED_SECRET.into()),
            ..AribaConfig::default()
        })
    }

    /// Context with custom Ariba settings.
    pub fn with_ariba(ariba: AribaConfig) -> Self {
        let memory = Arc::new(MemoryStore::default());
        let seeded = seed(&memory);
        let store = Arc::new(FlakyStore::new(memory));

        let state = AppState::new(
            store.clone() as Arc<dyn StorefrontStore>,
            ariba,
            &AppSettings {
                storefront_url: STOREFRONT_URL.into(),
            },
            JwtConfig {
                key: JWT_KEY.into(),
                ..JwtConfig::default()
            },
        )
        .expect("Failed to build app state");

        Self {
            store,
            router: router(state),
            seeded,
        }
    }

    pub fn memory(&self) -> &MemoryStore {
        self.store.inner()
    }

    pub fn set_faults(&self, faults: Faults) {
        self.store.set_faults(faults);
    }

    pub async fn cart_items(&self) -> Vec<ShoppingCartItem> {
        self.memory()
            .cart_items(self.seeded.cart_id)
            .await
            .expect("cart lookup failed")
    }

    pub fn error_log(&self) -> Vec<ErrorLogEntry> {
        self.memory().error_log()
    }

    /// Inserts a session for the seeded user created at `created_at`.
    pub async fn insert_session(&self, session_id: &str, created_at: DateTime<Utc>) {
        self.insert_session_for(session_id, self.seeded.user_id, created_at)
            .await;
    }

    pub async fn insert_session_for(
        &self,
        session_id: &str,
        user_id: Uuid,
        created_at: DateTime<Utc>,
    ) {
        let session = PunchOutSession::new(
            session_id,
            SENDER_DUNS,
            "buyer-cookie-1",
            "https://buyer.example/punchout/return",
            Operation::Create,
            user_id,
            created_at,
            5,
        );
        self.memory()
            .create_session(session)
            .await
            .expect("Failed to insert session");
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

fn seed(store: &MemoryStore) -> Seeded {
    let client_id = Uuid::new_v4();
    let other_client_id = Uuid::new_v4();

    let user = ApplicationUser {
        id: Uuid::new_v4(),
        email: USER_EMAIL.into(),
        given_name: Some("Jane".into()),
        family_name: Some("Buyer".into()),
        client_id: Some(client_id),
        ariba_id: Some(ARIBA_USER_ID.into()),
        roles: vec!["Customer".into(), "Purchaser".into()],
    };
    let cartless = ApplicationUser {
        id: Uuid::new_v4(),
        email: "no.cart@acme.example".into(),
        given_name: None,
        family_name: None,
        client_id: Some(client_id),
        ariba_id: Some("no.cart@acme-ariba".into()),
        roles: vec![],
    };
    let cart = ShoppingCart::new(user.id);

    let abc123 = contract_item(client_id, "ABC123", Decimal::new(1000, 2));
    store.insert_contract_item(abc123.clone());
    store.insert_contract_item(contract_item(client_id, "XYZ-9", Decimal::new(250, 2)));
    // Belongs to another client
    store.insert_contract_item(contract_item(other_client_id, "OTHER-1", Decimal::new(100, 2)));

    store.insert_user(user.clone());
    store.insert_user(cartless.clone());
    store.insert_cart(cart.clone());

    Seeded {
        client_id,
        user_id: user.id,
        cart_id: cart.id,
        abc123_id: abc123.id,
        cartless_user_id: cartless.id,
    }
}

fn contract_item(client_id: Uuid, stock_number: &str, price: Decimal) -> ContractItem {
    ContractItem {
        id: Uuid::new_v4(),
        client_id,
        customer_stock_number: stock_number.into(),
        description: format!("Contract line {}", stock_number),
        price,
        sku_id: None,
        length_id: None,
        diameter_id: None,
        non_stock: false,
        expires_at: None,
    }
}
