//! Login bridge: trades a PunchOut session id for an access token.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::Utc;
use punchout::session::redeem_session;
use storefront_core::ErrorLogEntry;
use telemetry::metrics;
use tracing::info;

use crate::extractors::RequestContext;
use crate::response::{ApiError, LoginResponse};
use crate::state::AppState;

/// POST /api/accounts/login/ariba
///
/// Body is a JSON string holding the session id.
pub async fn login_ariba_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    body: Result<Json<String>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(session_id) = body.map_err(|e| {
        ApiError::bad_request(format!("Body must be a JSON string session id: {}", e.body_text()))
    })?;
    let session_id = session_id.trim().to_string();

    let now = Utc::now();
    let redeemed = match redeem_session(state.store.as_ref(), &session_id, now).await {
        Ok(redeemed) => redeemed,
        Err(err) => {
            state
                .punchout
                .reporter()
                .record(
                    ErrorLogEntry::from_error("PunchOut login rejected", &err)
                        .with_session(Some(&session_id))
                        .with_context(&ctx.log_context()),
                )
                .await;
            return Err(err.into());
        }
    };
    let (session, user) = redeemed;

    let token = state.tokens.issue(&user, now)?;
    metrics().tokens_issued.inc();

    info!(
        session_id = %session.session_id,
        user_id = %user.id,
        operation = %session.operation,
        "PunchOut session redeemed"
    );

    Ok(Json(LoginResponse::bearer(
        token.access_token,
        token.expires_in,
        session.session_id,
    )))
}
