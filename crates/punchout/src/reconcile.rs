//! Cart reconciliation for `edit` / `inspect` setups.
//!
//! External lines are matched by customer stock number against the user's
//! client-scoped contract items. Prices always come from the catalog; the
//! buyer's unit price is only compared for diagnostics. Bad lines are
//! skipped one by one and never abort the request.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;
use storefront_core::cxml::ItemOut;
use storefront_core::limits::PRICE_TOLERANCE_CENTS;
use storefront_core::{
    ApplicationUser, ErrorCategory, ErrorLogEntry, NewCartItem, Result, Severity, ShoppingCart,
};
use storefront_store::StorefrontStore;
use telemetry::metrics;
use tracing::{debug, warn};

use crate::reporter::{ErrorReporter, LogContext};

/// Result of reconciling one setup request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileOutcome {
    /// Lines to write, at most one per contract item
    pub staged: Vec<NewCartItem>,
    /// Lines dropped for a bad quantity or a blank part id
    pub skipped: usize,
    /// Part ids with no current contract item
    pub unmatched: Vec<String>,
    /// Lines whose buyer price drifted from the contract price
    pub price_changed: usize,
}

impl ReconcileOutcome {
    pub fn total_skipped(&self) -> usize {
        self.skipped + self.unmatched.len()
    }
}

/// A buyer quantity after truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineQuantity {
    pub value: i32,
    /// The buyer sent more units than a cart line holds
    pub clamped: bool,
}

/// Parses a cXML quantity and truncates it toward zero.
///
/// Non-numeric, non-positive, and sub-unit quantities yield `None`.
/// Quantities above `i32::MAX` saturate.
pub fn parse_quantity(raw: &str) -> Option<LineQuantity> {
    let quantity = Decimal::from_str(raw.trim()).ok()?.trunc();
    if quantity <= Decimal::ZERO {
        return None;
    }
    Some(match quantity.to_i32() {
        Some(value) => LineQuantity {
            value,
            clamped: false,
        },
        None => LineQuantity {
            value: i32::MAX,
            clamped: true,
        },
    })
}

/// Whether a buyer price differs from the contract price by more than a cent.
pub fn price_differs(external: Decimal, authoritative: Decimal) -> bool {
    (external - authoritative).abs() > Decimal::new(PRICE_TOLERANCE_CENTS, 2)
}

/// Matches buyer-supplied lines against the contract catalog.
pub struct CartReconciler<'a> {
    store: &'a dyn StorefrontStore,
    reporter: &'a ErrorReporter,
}

impl<'a> CartReconciler<'a> {
    pub fn new(store: &'a dyn StorefrontStore, reporter: &'a ErrorReporter) -> Self {
        Self { store, reporter }
    }

    /// Builds the replacement contents of `cart`.
    ///
    /// Nothing is written to the cart here; the caller commits `staged`
    /// together with the session, even when it is empty.
    pub async fn reconcile(
        &self,
        user: &ApplicationUser,
        cart: &ShoppingCart,
        items: &[ItemOut],
        context: &LogContext,
        now: DateTime<Utc>,
    ) -> Result<ReconcileOutcome> {
        let mut outcome = ReconcileOutcome::default();

        for (index, item) in items.iter().enumerate() {
            let line = item
                .line_number
                .clone()
                .unwrap_or_else(|| (index + 1).to_string());

            let Some(part_id) = item.supplier_part_id() else {
                debug!(line = %line, "Skipping line without SupplierPartID");
                outcome.skipped += 1;
                continue;
            };

            let Some(quantity) = parse_quantity(&item.quantity) else {
                outcome.skipped += 1;
                self.record_gap(
                    "PunchOut line has invalid quantity",
                    format!(
                        "Quantity '{}' on line {} is not a whole positive number",
                        item.quantity, line
                    ),
                    part_id,
                    &line,
                    user,
                    context,
                )
                .await;
                continue;
            };
            if quantity.clamped {
                self.record_gap(
                    "PunchOut quantity clamped",
                    format!(
                        "Quantity '{}' on line {} was reduced to {}",
                        item.quantity,
                        line,
                        quantity.value
                    ),
                    part_id,
                    &line,
                    user,
                    context,
                )
                .await;
            }
            let quantity = quantity.value;

            let contract_item = match user.client_id {
                Some(client_id) => self.store.find_contract_item(client_id, part_id, now).await?,
                None => None,
            };

            let Some(contract_item) = contract_item else {
                outcome.unmatched.push(part_id.to_string());
                self.record_gap(
                    "PunchOut item not in contract catalog",
                    format!(
                        "SupplierPartID '{}' on line {} matched no current contract item",
                        part_id, line
                    ),
                    part_id,
                    &line,
                    user,
                    context,
                )
                .await;
                continue;
            };

            if let Some(external) = item.unit_price().and_then(|p| Decimal::from_str(p).ok()) {
                if price_differs(external, contract_item.price) {
                    debug!(
                        supplier_part_id = %part_id,
                        external_price = %external,
                        contract_price = %contract_item.price,
                        "Buyer price differs from contract price"
                    );
                    outcome.price_changed += 1;
                }
            }

            match outcome
                .staged
                .iter_mut()
                .find(|s| s.contract_item_id == contract_item.id)
            {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(quantity);
                }
                None => outcome.staged.push(NewCartItem {
                    cart_id: cart.id,
                    contract_item_id: contract_item.id,
                    quantity,
                    unit_price: contract_item.price,
                }),
            }
        }

        let m = metrics();
        m.items_reconciled.inc_by(outcome.staged.len() as u64);
        m.items_skipped.inc_by(outcome.skipped as u64);
        m.items_unmatched.inc_by(outcome.unmatched.len() as u64);
        m.price_mismatches.inc_by(outcome.price_changed as u64);

        if outcome.staged.is_empty() {
            m.carts_cleared_empty.inc();
            warn!(
                user_id = %user.id,
                cart_id = %cart.id,
                received = items.len(),
                "PunchOut edit matched no items; cart will be emptied"
            );
            self.reporter
                .record(
                    ErrorLogEntry::new(
                        Severity::Warning,
                        ErrorCategory::ReconciliationGap,
                        "PunchOut cart emptied",
                        format!(
                            "None of {} buyer line(s) matched the contract catalog; the cart was cleared",
                            items.len()
                        ),
                    )
                    .with("user_id", user.id.to_string())
                    .with("cart_id", cart.id.to_string())
                    .with("skipped", outcome.total_skipped().to_string())
                    .with_context(context),
                )
                .await;
        }

        Ok(outcome)
    }

    /// Logs a per-line Info entry.
    async fn record_gap(
        &self,
        title: &str,
        detail: String,
        part_id: &str,
        line: &str,
        user: &ApplicationUser,
        context: &LogContext,
    ) {
        self.reporter
            .record(
                ErrorLogEntry::new(Severity::Info, ErrorCategory::ReconciliationGap, title, detail)
                    .with("supplier_part_id", part_id)
                    .with("line_number", line)
                    .with(
                        "client_id",
                        user.client_id.map(|c| c.to_string()).unwrap_or_default(),
                    )
                    .with_context(context),
            )
            .await;
    }
}
