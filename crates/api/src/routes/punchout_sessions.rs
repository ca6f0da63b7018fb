//! PunchOut setup endpoint.

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, Response, StatusCode},
};
use punchout::{ErrorReporter, ResponseComposer};
use std::any::Any;
use storefront_core::{ErrorCategory, ErrorLogEntry, Severity};
use tower_http::catch_panic::ResponseForPanic;
use tracing::{debug, error};

use crate::extractors::RequestContext;
use crate::response::{CxmlResponse, CXML_CONTENT_TYPE};
use crate::state::AppState;

/// POST /api/punchoutsessions/request-punch-out
///
/// Anonymous. The body is a raw cXML document; the content type is ignored.
/// The cXML `Status` code always equals the HTTP status.
pub async fn request_punch_out_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    body: Bytes,
) -> CxmlResponse {
    debug!(payload_size = body.len(), "Received PunchOut setup request");

    let outcome = state.punchout.handle_setup(&body, ctx.log_context()).await;
    CxmlResponse::from(outcome)
}

/// Turns a panic in the setup handler into a 500 cXML envelope.
#[derive(Clone)]
pub struct PanicEnvelope {
    composer: ResponseComposer,
    reporter: ErrorReporter,
}

impl PanicEnvelope {
    pub fn new(state: &AppState) -> Self {
        Self {
            composer: state.punchout.composer().clone(),
            reporter: state.punchout.reporter().clone(),
        }
    }
}

fn panic_message(err: &(dyn Any + Send)) -> String {
    if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    }
}

impl ResponseForPanic for PanicEnvelope {
    type ResponseBody = Body;

    fn response_for_panic(&mut self, err: Box<dyn Any + Send + 'static>) -> Response<Body> {
        let detail = panic_message(err.as_ref());
        error!(panic = %detail, "PunchOut setup handler panicked");

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let reporter = self.reporter.clone();
            let entry = ErrorLogEntry::new(
                Severity::Error,
                ErrorCategory::InternalFailure,
                "PunchOut setup panicked",
                detail,
            );
            handle.spawn(async move { reporter.record(entry).await });
        }

        let status = StatusCode::INTERNAL_SERVER_ERROR;
        let body = self.composer.error(status.as_u16(), "Internal server error");
        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static(CXML_CONTENT_TYPE),
        );
        response
    }
}
