//! The PunchOut setup state machine.
//!
//! ```text
//! ReceivedRaw → Deserialized → SenderValidated → UserResolved
//!     → EditReconciled | SkipReconcile → SessionCreated → ResponseComposed
//! ```
//!
//! Any failing transition short-circuits to an error envelope whose status
//! code matches the HTTP status. Nothing is persisted before the final
//! commit, so a rejected request never leaves a session or a cart change
//! behind.

use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use storefront_core::{
    Error, ErrorLogEntry, InputErrorCode, PunchOutSession, ResourceErrorCode, Result,
};
use storefront_store::{CartReplacement, SetupCommit, StorefrontStore};
use telemetry::metrics;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::compose::ResponseComposer;
use crate::config::{AppSettings, AribaConfig};
use crate::credentials;
use crate::document::parse_document;
use crate::reconcile::CartReconciler;
use crate::reporter::{ErrorReporter, LogContext};
use crate::session::allocate_session_id;

/// Where a setup request got to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStage {
    ReceivedRaw,
    Deserialized,
    SenderValidated,
    UserResolved,
    EditReconciled,
    SkipReconcile,
    SessionCreated,
    ResponseComposed,
}

impl SetupStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReceivedRaw => "received_raw",
            Self::Deserialized => "deserialized",
            Self::SenderValidated => "sender_validated",
            Self::UserResolved => "user_resolved",
            Self::EditReconciled => "edit_reconciled",
            Self::SkipReconcile => "skip_reconcile",
            Self::SessionCreated => "session_created",
            Self::ResponseComposed => "response_composed",
        }
    }
}

impl std::fmt::Display for SetupStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP status plus cXML body for one setup request.
#[derive(Debug, Clone, PartialEq)]
pub struct SetupOutcome {
    pub status: u16,
    pub body: String,
    /// Set only when a session was created
    pub session_id: Option<String>,
}

/// Progress tracked while a request moves through the stages.
struct SetupProgress {
    stage: SetupStage,
    user_email: Option<String>,
    user_id: Option<String>,
    session_id: Option<String>,
}

impl SetupProgress {
    fn new() -> Self {
        Self {
            stage: SetupStage::ReceivedRaw,
            user_email: None,
            user_id: None,
            session_id: None,
        }
    }

    fn advance(&mut self, stage: SetupStage) {
        debug!(from = %self.stage, to = %stage, "PunchOut setup stage");
        self.stage = stage;
    }
}

/// Handles inbound PunchOut setup requests.
#[derive(Clone)]
pub struct PunchOutService {
    store: Arc<dyn StorefrontStore>,
    reporter: ErrorReporter,
    composer: ResponseComposer,
    ariba: AribaConfig,
}

impl PunchOutService {
    pub fn new(
        store: Arc<dyn StorefrontStore>,
        ariba: AribaConfig,
        app: &AppSettings,
    ) -> Result<Self> {
        if ariba.session_ttl_minutes <= 0 {
            return Err(Error::configuration(format!(
                "ariba.session_ttl_minutes must be positive, got {}",
                ariba.session_ttl_minutes
            )));
        }
        if ariba.shared_secret.as_deref().map_or(true, str::is_empty) {
            warn!("Ariba shared secret is not configured; every PunchOut setup will be rejected");
        }

        Ok(Self {
            reporter: ErrorReporter::new(store.clone()),
            composer: ResponseComposer::new(app, &ariba)?,
            store,
            ariba,
        })
    }

    pub fn composer(&self) -> &ResponseComposer {
        &self.composer
    }

    pub fn reporter(&self) -> &ErrorReporter {
        &self.reporter
    }

    /// Runs the full setup flow. Always yields a response body.
    pub async fn handle_setup(&self, body: &[u8], context: LogContext) -> SetupOutcome {
        let start = Instant::now();
        metrics().setup_requests.inc();

        let mut progress = SetupProgress::new();
        let result = self.run(body, &context, &mut progress).await;
        metrics().setup_latency_ms.observe(start.elapsed().as_millis() as u64);

        match result {
            Ok((session_id, body)) => {
                metrics().setup_succeeded.inc();
                info!(
                    session_id = %session_id,
                    user_id = progress.user_id.as_deref().unwrap_or(""),
                    latency_ms = start.elapsed().as_millis() as u64,
                    "PunchOut setup completed"
                );
                SetupOutcome {
                    status: 200,
                    body,
                    session_id: Some(session_id),
                }
            }
            Err(err) => {
                metrics().setup_failed.inc();
                let status = err.http_status();

                let mut entry = ErrorLogEntry::from_error("PunchOut setup rejected", &err)
                    .with("stage", progress.stage.as_str())
                    .with_session(progress.session_id.as_deref());
                if let Some(email) = &progress.user_email {
                    entry = entry.with("user_email", email.as_str());
                }
                if let Some(user_id) = &progress.user_id {
                    entry = entry.with("user_id", user_id.as_str());
                }
                self.reporter.record(entry.with_context(&context)).await;

                SetupOutcome {
                    status,
                    body: self.composer.error(status, &err.public_message()),
                    session_id: None,
                }
            }
        }
    }

    async fn run(
        &self,
        body: &[u8],
        context: &LogContext,
        progress: &mut SetupProgress,
    ) -> Result<(String, String)> {
        let doc = parse_document(body)?;
        progress.advance(SetupStage::Deserialized);

        let sender = credentials::extract_sender(&doc)?;
        credentials::verify_shared_secret(
            self.ariba.shared_secret.as_deref(),
            &sender.shared_secret,
        )?;
        progress.advance(SetupStage::SenderValidated);

        let request = doc.punch_out_setup_request().ok_or_else(|| {
            Error::input(
                InputErrorCode::InvalidRequest,
                "Request does not contain a PunchOutSetupRequest",
            )
        })?;
        let operation = request.operation()?;

        let email = credentials::extract_user_email(request)?;
        progress.user_email = Some(email.to_string());
        let user = credentials::resolve_user(self.store.as_ref(), email).await?;
        progress.user_id = Some(user.id.to_string());
        credentials::verify_identity_binding(&user, &sender.ariba_user_id)?;
        progress.advance(SetupStage::UserResolved);

        let now = Utc::now();
        let cart_replacement = if operation.reconciles_cart() {
            let cart = self
                .store
                .find_cart_for_user(user.id)
                .await?
                .ok_or_else(|| {
                    Error::resource(
                        ResourceErrorCode::CartNotFound,
                        "No shopping cart is provisioned for this user",
                    )
                    .with_status(401)
                })?;

            let outcome = CartReconciler::new(self.store.as_ref(), &self.reporter)
                .reconcile(&user, &cart, &request.items, context, now)
                .await?;
            debug!(
                operation = %operation,
                staged = outcome.staged.len(),
                skipped = outcome.total_skipped(),
                price_changed = outcome.price_changed,
                "Reconciled PunchOut cart"
            );
            progress.advance(SetupStage::EditReconciled);

            Some(CartReplacement {
                cart_id: cart.id,
                items: outcome.staged,
            })
        } else {
            progress.advance(SetupStage::SkipReconcile);
            None
        };

        let session_id = allocate_session_id(self.store.as_ref()).await?;
        progress.session_id = Some(session_id.clone());

        let session = PunchOutSession::new(
            session_id.clone(),
            sender.from_id,
            request.buyer_cookie().unwrap_or_default(),
            request.post_url().unwrap_or_default(),
            operation,
            user.id,
            now,
            self.ariba.session_ttl_minutes,
        );
        session.validate().map_err(|e| {
            Error::input(
                InputErrorCode::InvalidRequest,
                format!("PunchOut session fields are invalid: {}", e),
            )
        })?;

        self.store
            .commit_setup(SetupCommit {
                session,
                cart_replacement,
            })
            .await?;
        metrics().sessions_created.inc();
        progress.advance(SetupStage::SessionCreated);

        let body = self.composer.success(&session_id)?;
        progress.advance(SetupStage::ResponseComposed);

        Ok((session_id, body))
    }
}
