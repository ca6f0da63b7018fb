//! Shopping carts.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One cart per user, provisioned with the account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingCart {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl ShoppingCart {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            created_at: Utc::now(),
        }
    }
}

/// A persisted cart line.
///
/// At most one line per (cart, contract item).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingCartItem {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub contract_item_id: Uuid,
    pub quantity: i32,
    /// Contract price when the line was staged
    pub unit_price: Decimal,
    #[serde(default = "Utc::now")]
    pub added_at: DateTime<Utc>,
}

/// A cart line staged for insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCartItem {
    pub cart_id: Uuid,
    pub contract_item_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl NewCartItem {
    /// Materializes the staged line.
    pub fn into_item(self, added_at: DateTime<Utc>) -> ShoppingCartItem {
        ShoppingCartItem {
            id: Uuid::new_v4(),
            cart_id: self.cart_id,
            contract_item_id: self.contract_item_id,
            quantity: self.quantity,
            unit_price: self.unit_price,
            added_at,
        }
    }
}
