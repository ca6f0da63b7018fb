//! Client-scoped contract catalog.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A client's negotiated, priced catalog line.
///
/// The customer stock number is only unique within one client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ContractItem {
    pub id: Uuid,
    /// Owning client
    pub client_id: Uuid,
    /// Buyer-facing identifier used as the PunchOut join key
    #[validate(length(min = 1, max = 128))]
    pub customer_stock_number: String,
    #[serde(default)]
    pub description: String,
    /// Authoritative price
    pub price: Decimal,
    #[serde(default)]
    pub sku_id: Option<Uuid>,
    #[serde(default)]
    pub length_id: Option<Uuid>,
    #[serde(default)]
    pub diameter_id: Option<Uuid>,
    #[serde(default)]
    pub non_stock: bool,
    /// Contract end; `None` means open-ended
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl ContractItem {
    /// Whether the contract line is still in force at `now`.
    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |end| now <= end)
    }

    /// Case-insensitive stock number match.
    pub fn matches_stock_number(&self, stock_number: &str) -> bool {
        self.customer_stock_number.trim().to_lowercase() == stock_number.trim().to_lowercase()
    }
}
