//! End-to-end tests for the PunchOut setup endpoint.
//!
//! Every request runs through the real router against a seeded in-memory
//! store; failure paths use the fault switches on `FlakyStore`.

use axum::http::StatusCode;
use axum_test::{TestResponse, TestServer};
use chrono::Utc;
use integration_tests::fixtures::{
    self, session_id_from, status_of, Line, SetupRequest, SENDER_DUNS,
};
use integration_tests::mocks::Faults;
use integration_tests::setup::TestContext;
use punchout::AribaConfig;
use rust_decimal::Decimal;
use storefront_core::{ErrorCategory, NewCartItem, Operation, Severity};
use storefront_store::StorefrontStore;

const SETUP_PATH: &str = "/api/punchoutsessions/request-punch-out";

fn server(ctx: &TestContext) -> TestServer {
    TestServer::new(ctx.router.clone()).expect("Failed to create test server")
}

async fn post_setup(server: &TestServer, request: &SetupRequest) -> TestResponse {
    server
        .post(SETUP_PATH)
        .content_type("text/xml")
        .bytes(request.to_xml().into())
        .await
}

fn assert_status_code(response: &TestResponse, expected: StatusCode) {
    response.assert_status(expected);
    let (code, _) = status_of(&response.text()).expect("response is not a cXML status envelope");
    assert_eq!(
        code,
        expected.as_u16().to_string(),
        "cXML Status code must equal the HTTP status"
    );
}

/// Puts `quantity` of ABC123 in the seeded cart.
async fn preload_cart(ctx: &TestContext, quantity: i32) {
    ctx.memory().insert_cart_item(
        NewCartItem {
            cart_id: ctx.seeded.cart_id,
            contract_item_id: ctx.seeded.abc123_id,
            quantity,
            unit_price: Decimal::new(1000, 2),
        }
        .into_item(Utc::now()),
    );
}

/// A create request yields a StartPage and a stored session
#[tokio::test]
async fn test_create_returns_start_page() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let response = post_setup(&server, &SetupRequest::create()).await;

    assert_status_code(&response, StatusCode::OK);
    assert_eq!(
        response.header("content-type").to_str().unwrap(),
        "text/xml; charset=utf-8"
    );

    let body = response.text();
    let (_, text) = status_of(&body).unwrap();
    assert_eq!(text, "success");
    assert!(body.contains("https://shop.example/login/ariba?sessionId="));

    let session_id = session_id_from(&body).expect("StartPage carries a session id");
    assert_eq!(session_id.len(), 8);

    let session = ctx
        .memory()
        .find_session(&session_id)
        .await
        .unwrap()
        .expect("session was not stored");
    assert_eq!(session.from_id, SENDER_DUNS);
    assert_eq!(session.buyer_cookie, "buyer-cookie-1");
    assert_eq!(
        session.post_url,
        "https://buyer.example/punchout/return?order=1&step=2"
    );
    assert_eq!(session.operation, Operation::Create);
    assert_eq!(session.user_id, ctx.seeded.user_id);
    assert_eq!(session.expires_at - session.created_at, chrono::Duration::minutes(5));
}

/// Create leaves the cart alone
#[tokio::test]
async fn test_create_does_not_touch_cart() {
    let ctx = TestContext::new();
    let server = server(&ctx);
    preload_cart(&ctx, 4).await;

    let request = SetupRequest::create().with_operation(Some("create"));
    let response = post_setup(&server, &request).await;

    response.assert_status_ok();
    let items = ctx.cart_items().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 4);
}

/// A missing operation attribute is treated as create
#[tokio::test]
async fn test_missing_operation_defaults_to_create() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let response = post_setup(&server, &SetupRequest::create().with_operation(None)).await;

    response.assert_status_ok();
    let session_id = session_id_from(&response.text()).unwrap();
    let session = ctx.memory().find_session(&session_id).await.unwrap().unwrap();
    assert_eq!(session.operation, Operation::Create);
}

/// Edit replaces the cart using contract prices and logs unknown lines
#[tokio::test]
async fn test_edit_reconciles_cart_at_contract_price() {
    let ctx = TestContext::new();
    let server = server(&ctx);
    preload_cart(&ctx, 7).await;

    let request = SetupRequest::edit(vec![
        Line::new("ABC123", "2.00").priced("9.50"),
        Line::new("NOPE", "1"),
    ]);
    let response = post_setup(&server, &request).await;

    assert_status_code(&response, StatusCode::OK);
    assert!(session_id_from(&response.text()).is_some());

    let items = ctx.cart_items().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].contract_item_id, ctx.seeded.abc123_id);
    assert_eq!(items[0].quantity, 2);
    assert_eq!(items[0].unit_price, Decimal::new(1000, 2));

    let gaps: Vec<_> = ctx
        .error_log()
        .into_iter()
        .filter(|e| e.category == ErrorCategory::ReconciliationGap)
        .collect();
    assert_eq!(gaps.len(), 1);
    assert_eq!(gaps[0].severity, Severity::Info);
    assert_eq!(gaps[0].context["supplier_part_id"], "NOPE");
}

/// Contract items of another client are not visible
#[tokio::test]
async fn test_edit_ignores_other_clients_catalog() {
    let ctx = TestContext::new();
    let server = server(&ctx);
    preload_cart(&ctx, 1).await;

    let request = SetupRequest::edit(vec![Line::new("OTHER-1", "3")]);
    let response = post_setup(&server, &request).await;

    response.assert_status_ok();
    assert!(ctx.cart_items().await.is_empty());
    assert!(ctx
        .error_log()
        .iter()
        .any(|e| e.title == "PunchOut cart emptied" && e.severity == Severity::Warning));
}

/// Inspect rewrites the cart the same way edit does
#[tokio::test]
async fn test_inspect_rewrites_cart() {
    let ctx = TestContext::new();
    let server = server(&ctx);
    preload_cart(&ctx, 5).await;

    let request = SetupRequest::edit(vec![Line::new("XYZ-9", "3")])
        .with_operation(Some("inspect"));
    let response = post_setup(&server, &request).await;

    response.assert_status_ok();
    let items = ctx.cart_items().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 3);
    assert_eq!(items[0].unit_price, Decimal::new(250, 2));

    let session_id = session_id_from(&response.text()).unwrap();
    let session = ctx.memory().find_session(&session_id).await.unwrap().unwrap();
    assert_eq!(session.operation, Operation::Inspect);
}

/// Wrong shared secret is rejected before anything is written
#[tokio::test]
async fn test_wrong_secret_returns_401() {
    let ctx = TestContext::new();
    let server = server(&ctx);
    preload_cart(&ctx, 5).await;

    let request = SetupRequest::edit(vec![Line::new("XYZ-9", "1")])
        .with_secret(Some("not-the-secret"));
    let response = post_setup(&server, &request).await;

    assert_status_code(&response, StatusCode::UNAUTHORIZED);
    assert!(session_id_from(&response.text()).is_none());
    assert_eq!(ctx.memory().session_count(), 0);

    let items = ctx.cart_items().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 5);

    let rejected = ctx
        .error_log()
        .into_iter()
        .find(|e| e.title == "PunchOut setup rejected")
        .expect("rejection was not logged");
    assert_eq!(rejected.category, ErrorCategory::AuthenticationFailure);
    assert_eq!(rejected.context["stage"], "deserialized");
    assert_eq!(rejected.context["request_path"], SETUP_PATH);
}

/// The secret is compared exactly as sent, surrounding whitespace included
#[tokio::test]
async fn test_padded_secret_returns_401() {
    let ctx = TestContext::new();
    let server = server(&ctx);
    preload_cart(&ctx, 5).await;

    let padded = format!(" {}\n", fixtures::SHARED_SECRET);
    let request = SetupRequest::edit(vec![Line::new("XYZ-9", "1")]).with_secret(Some(&padded));
    let response = post_setup(&server, &request).await;

    assert_status_code(&response, StatusCode::UNAUTHORIZED);
    assert!(session_id_from(&response.text()).is_none());
    assert_eq!(ctx.memory().session_count(), 0);
    assert_eq!(ctx.cart_items().await[0].quantity, 5);
}

/// Without a configured secret every request is unauthorized
#[tokio::test]
async fn test_unconfigured_secret_returns_401() {
    let ctx = TestContext::with_ariba(AribaConfig::default());
    let server = server(&ctx);

    let response = post_setup(&server, &SetupRequest::create()).await;

    assert_status_code(&response, StatusCode::UNAUTHORIZED);
    assert_eq!(ctx.memory().session_count(), 0);
}

/// A document without a Header is malformed
#[tokio::test]
async fn test_missing_header_returns_400() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let response = post_setup(&server, &SetupRequest::create().without_header()).await;

    assert_status_code(&response, StatusCode::BAD_REQUEST);
}

/// The shared secret must sit in a NetworkId/AribaNetworkUserId credential
#[tokio::test]
async fn test_secret_in_wrong_domain_returns_400() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let request = SetupRequest::create().with_secret_domain("DUNS");
    let response = post_setup(&server, &request).await;

    assert_status_code(&response, StatusCode::BAD_REQUEST);
}

/// A sender without a DUNS/NetworkID identity is malformed
#[tokio::test]
async fn test_missing_sender_identity_returns_400() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let request = SetupRequest::create().with_sender_domain("PrivateId");
    let response = post_setup(&server, &request).await;

    assert_status_code(&response, StatusCode::BAD_REQUEST);
}

/// An email with no matching user is malformed input
#[tokio::test]
async fn test_unknown_email_returns_400() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let request = SetupRequest::create().with_email(Some("nobody@acme.example"));
    let response = post_setup(&server, &request).await;

    assert_status_code(&response, StatusCode::BAD_REQUEST);
    assert_eq!(ctx.memory().session_count(), 0);
}

/// A missing UserEmail extrinsic is malformed input
#[tokio::test]
async fn test_missing_email_returns_400() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let response = post_setup(&server, &SetupRequest::create().with_email(None)).await;

    assert_status_code(&response, StatusCode::BAD_REQUEST);
}

/// The Ariba identity must match the one stored on the user
#[tokio::test]
async fn test_identity_mismatch_returns_401() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let request = SetupRequest::create().with_ariba_user("mallory@other-ariba");
    let response = post_setup(&server, &request).await;

    assert_status_code(&response, StatusCode::UNAUTHORIZED);
    assert_eq!(ctx.memory().session_count(), 0);

    let rejected = ctx
        .error_log()
        .into_iter()
        .find(|e| e.title == "PunchOut setup rejected")
        .unwrap();
    assert_eq!(rejected.context["user_email"], fixtures::USER_EMAIL);
    assert_eq!(rejected.context["user_id"], ctx.seeded.user_id.to_string());
}

/// An edit from the wrong Ariba identity leaves the cart as it was
#[tokio::test]
async fn test_identity_mismatch_leaves_cart_untouched() {
    let ctx = TestContext::new();
    let server = server(&ctx);
    preload_cart(&ctx, 5).await;

    let request = SetupRequest::edit(vec![Line::new("XYZ-9", "3")])
        .with_ariba_user("mallory@other-ariba");
    let response = post_setup(&server, &request).await;

    assert_status_code(&response, StatusCode::UNAUTHORIZED);
    assert!(session_id_from(&response.text()).is_none());
    assert_eq!(ctx.memory().session_count(), 0);

    let items = ctx.cart_items().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].contract_item_id, ctx.seeded.abc123_id);
    assert_eq!(items[0].quantity, 5);
}

/// Quantities too large for a cart line are capped and logged
#[tokio::test]
async fn test_oversized_quantity_is_capped() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let request = SetupRequest::edit(vec![
        Line::new("ABC123", "5000000000"),
        Line::new("XYZ-9", "0.5"),
    ]);
    let response = post_setup(&server, &request).await;

    assert_status_code(&response, StatusCode::OK);
    let items = ctx.cart_items().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].contract_item_id, ctx.seeded.abc123_id);
    assert_eq!(items[0].quantity, i32::MAX);

    let titles: Vec<_> = ctx
        .error_log()
        .into_iter()
        .filter(|e| e.category == ErrorCategory::ReconciliationGap)
        .map(|e| e.title)
        .collect();
    assert!(titles.iter().any(|t| t == "PunchOut quantity clamped"));
    assert!(titles.iter().any(|t| t == "PunchOut line has invalid quantity"));
}

/// Unsupported operations are rejected
#[tokio::test]
async fn test_unknown_operation_returns_400() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let request = SetupRequest::create().with_operation(Some("purge"));
    let response = post_setup(&server, &request).await;

    assert_status_code(&response, StatusCode::BAD_REQUEST);
}

/// Edit for a user without a cart is unauthorized
#[tokio::test]
async fn test_edit_without_cart_returns_401() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let request = SetupRequest::edit(vec![Line::new("ABC123", "1")])
        .with_email(Some("no.cart@acme.example"))
        .with_ariba_user("no.cart@acme-ariba");
    let response = post_setup(&server, &request).await;

    assert_status_code(&response, StatusCode::UNAUTHORIZED);
    assert_eq!(ctx.memory().session_count(), 0);
}

/// Create works for a user without a cart
#[tokio::test]
async fn test_create_without_cart_succeeds() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let request = SetupRequest::create()
        .with_email(Some("no.cart@acme.example"))
        .with_ariba_user("no.cart@acme-ariba");
    let response = post_setup(&server, &request).await;

    response.assert_status_ok();
    let session_id = session_id_from(&response.text()).unwrap();
    let session = ctx.memory().find_session(&session_id).await.unwrap().unwrap();
    assert_eq!(session.user_id, ctx.seeded.cartless_user_id);
}

/// A body that is not XML gets a 400 cXML envelope
#[tokio::test]
async fn test_garbage_body_returns_400() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let response = server
        .post(SETUP_PATH)
        .content_type("application/octet-stream")
        .bytes("this is not cXML at all".into())
        .await;

    assert_status_code(&response, StatusCode::BAD_REQUEST);
}

/// A failed commit leaves no session and the cart unchanged
#[tokio::test]
async fn test_commit_failure_returns_500() {
    let ctx = TestContext::new();
    let server = server(&ctx);
    preload_cart(&ctx, 5).await;
    ctx.set_faults(Faults {
        fail_commit: true,
        ..Faults::default()
    });

    let request = SetupRequest::edit(vec![Line::new("XYZ-9", "1")]);
    let response = post_setup(&server, &request).await;

    assert_status_code(&response, StatusCode::INTERNAL_SERVER_ERROR);
    let (_, text) = status_of(&response.text()).unwrap();
    assert_eq!(text, "Internal server error");

    assert_eq!(ctx.memory().session_count(), 0);
    assert_eq!(ctx.store.commit_count(), 0);
    let items = ctx.cart_items().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].contract_item_id, ctx.seeded.abc123_id);
    assert_eq!(items[0].quantity, 5);
}

/// A broken error log never changes the response
#[tokio::test]
async fn test_error_log_failure_is_swallowed() {
    let ctx = TestContext::new();
    let server = server(&ctx);
    ctx.set_faults(Faults {
        fail_error_log: true,
        ..Faults::default()
    });

    let rejected = post_setup(&server, &SetupRequest::create().with_secret(Some("nope"))).await;
    assert_status_code(&rejected, StatusCode::UNAUTHORIZED);

    let request = SetupRequest::edit(vec![Line::new("NOPE", "1")]);
    let accepted = post_setup(&server, &request).await;
    assert_status_code(&accepted, StatusCode::OK);
    assert_eq!(ctx.store.commit_count(), 1);
    assert!(ctx.error_log().is_empty());
}

/// A panic inside the pipeline still produces a cXML envelope
#[tokio::test]
async fn test_panic_returns_cxml_500() {
    let ctx = TestContext::new();
    let server = server(&ctx);
    ctx.set_faults(Faults {
        panic_on_user_lookup: true,
        ..Faults::default()
    });

    let response = post_setup(&server, &SetupRequest::create()).await;

    assert_status_code(&response, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.header("content-type").to_str().unwrap(),
        "text/xml; charset=utf-8"
    );
    assert_eq!(ctx.memory().session_count(), 0);
}

/// Envelopes use the strict wire format buyers validate against
#[tokio::test]
async fn test_envelope_wire_format() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    for request in [
        SetupRequest::create(),
        SetupRequest::create().with_secret(Some("wrong")),
    ] {
        let body = post_setup(&server, &request).await.text();

        assert!(body.starts_with(
            r#"<?xml version="1.0" encoding="UTF-8"?><!DOCTYPE cXML SYSTEM "http://xml.cxml.org/schemas/cXML/1.2.014/cXML.dtd"><cXML "#
        ));
        assert!(!body.starts_with('\u{feff}'));
        assert!(body.contains(r#"version="1.2.014""#));
        assert!(body.contains("payloadID=\""));
        assert!(!body.contains("xmlns"));
        assert!(!body.contains('\n'));
    }
}

/// Each setup gets its own session id
#[tokio::test]
async fn test_session_ids_are_distinct() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let first = session_id_from(&post_setup(&server, &SetupRequest::create()).await.text());
    let second = session_id_from(&post_setup(&server, &SetupRequest::create()).await.text());

    assert!(first.is_some());
    assert_ne!(first, second);
    assert_eq!(ctx.memory().session_count(), 2);

    let session = ctx
        .memory()
        .find_session(first.as_deref().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert!(!session.is_expired(Utc::now()));
}
