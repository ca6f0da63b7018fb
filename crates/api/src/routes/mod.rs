//! API routes.

pub mod accounts;
pub mod health;
pub mod punchout_sessions;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Creates the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let panic_handler = punchout_sessions::PanicEnvelope::new(&state);

    Router::new()
        .route(
            "/api/punchoutsessions/request-punch-out",
            post(punchout_sessions::request_punch_out_handler)
                .layer(CatchPanicLayer::custom(panic_handler)),
        )
        .route("/api/accounts/login/ariba", post(accounts::login_ariba_handler))
        .route("/health", get(health::health_handler))
        .route("/health/ready", get(health::ready_handler))
        .route("/health/live", get(health::live_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}
