//! Application state shared across handlers.

use punchout::{AppSettings, AribaConfig, PunchOutService};
use std::sync::Arc;
use storefront_core::Result;
use storefront_store::StorefrontStore;

use crate::token::{JwtConfig, TokenIssuer};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Persistence backend (in-memory in production, wrapped doubles in tests)
    pub store: Arc<dyn StorefrontStore>,
    /// PunchOut setup flow
    pub punchout: Arc<PunchOutService>,
    /// Access-token signer for the login bridge
    pub tokens: TokenIssuer,
}

impl AppState {
    pub fn new(
        store: Arc<dyn StorefrontStore>,
        ariba: AribaConfig,
        app: &AppSettings,
        jwt: JwtConfig,
    ) -> Result<Self> {
        let punchout = PunchOutService::new(store.clone(), ariba, app)?;
        Ok(Self {
            store,
            punchout: Arc::new(punchout),
            tokens: TokenIssuer::new(jwt)?,
        })
    }
}
