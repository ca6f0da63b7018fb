//! Store health checks.

use tracing::{debug, error};

use crate::store::StorefrontStore;

/// Check store reachability.
pub async fn check_connection(store: &dyn StorefrontStore) -> bool {
    match store.ping().await {
        Ok(()) => {
            debug!("Store connection healthy");
            true
        }
        Err(e) => {
            error!("Store health check failed: {}", e);
            false
        }
    }
}
