//! HTTP API layer for the PunchOut storefront.

pub mod extractors;
pub mod response;
pub mod routes;
pub mod state;
pub mod token;

pub use routes::router;
pub use state::AppState;
pub use token::{Claims, JwtConfig, TokenIssuer};
