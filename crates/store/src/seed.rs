//! Startup seed data for the in-memory store.

use serde::{Deserialize, Serialize};
use std::path::Path;
use storefront_core::taxonomy::Taxonomy;
use storefront_core::{
    ApplicationUser, ContractItem, Error, Result, ShoppingCart, ShoppingCartItem,
};
use tracing::{info, warn};
use validator::Validate;

use crate::memory::MemoryStore;

/// Seed file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedData {
    pub taxonomy: Taxonomy,
    pub users: Vec<ApplicationUser>,
    pub carts: Vec<ShoppingCart>,
    pub cart_items: Vec<ShoppingCartItem>,
    pub contract_items: Vec<ContractItem>,
}

/// Counts from [`SeedData::apply`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub carts: usize,
    pub cart_items: usize,
    pub contract_items: usize,
    pub taxonomy_inserted: usize,
    pub taxonomy_updated: usize,
    pub rejected: usize,
}

impl SeedData {
    /// Reads a JSON seed file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration(format!("Failed to read seed file {}: {}", path.display(), e))
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Loads the seed into `store`, skipping records that fail validation.
    pub fn apply(self, store: &MemoryStore) -> SeedSummary {
        let mut summary = SeedSummary::default();

        let merged = store.merge_taxonomy(self.taxonomy);
        summary.taxonomy_inserted = merged.inserted;
        summary.taxonomy_updated = merged.updated;

        for user in self.users {
            if let Err(e) = user.validate() {
                warn!(user_id = %user.id, error = %e, "Skipping invalid seed user");
                summary.rejected += 1;
                continue;
            }
            store.insert_user(user);
            summary.users += 1;
        }

        for cart in self.carts {
            store.insert_cart(cart);
            summary.carts += 1;
        }

        for item in self.cart_items {
            if item.quantity <= 0 {
                warn!(cart_item_id = %item.id, quantity = item.quantity, "Skipping cart line without a positive quantity");
                summary.rejected += 1;
                continue;
            }
            store.insert_cart_item(item);
            summary.cart_items += 1;
        }

        for item in self.contract_items {
            if let Err(e) = item.validate() {
                warn!(contract_item_id = %item.id, error = %e, "Skipping invalid contract item");
                summary.rejected += 1;
                continue;
            }
            store.insert_contract_item(item);
            summary.contract_items += 1;
        }

        info!(
            users = summary.users,
            carts = summary.carts,
            cart_items = summary.cart_items,
            contract_items = summary.contract_items,
            taxonomy_inserted = summary.taxonomy_inserted,
            rejected = summary.rejected,
            "Seed data loaded"
        );

        summary
    }
}
