//! Protocol constants and limits for the PunchOut storefront.
//!
//! The `#[validate]` derive macro requires literal values in attributes,
//! so field lengths are duplicated there. Keep both in sync when modifying.

// === cXML ===

/// cXML version advertised in every response.
pub const CXML_VERSION: &str = "1.2.014";

/// DTD referenced by the response DOCTYPE.
pub const CXML_DTD_URL: &str = "http://xml.cxml.org/schemas/cXML/1.2.014/cXML.dtd";

/// Maximum accepted cXML request body (1MB).
///
/// Large edit carts with a few thousand ItemOut lines stay well below this.
pub const MAX_CXML_BODY_BYTES: usize = 1024 * 1024;

/// Sender identity domains accepted in `<From>`.
pub const SENDER_DOMAINS: &[&str] = &["DUNS", "NetworkID"];

/// Credential domains that may carry the shared secret in `<Sender>`.
pub const SHARED_SECRET_DOMAINS: &[&str] = &["NetworkId", "AribaNetworkUserId"];

/// Extrinsic carrying the buyer's email.
pub const USER_EMAIL_EXTRINSIC: &str = "UserEmail";

// === Sessions ===

/// Number of decimal digits in a session id.
pub const SESSION_ID_DIGITS: u32 = 8;

/// Default PunchOut session lifetime.
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 5;

/// Attempts to draw an unused session id before giving up.
pub const SESSION_ID_MAX_ATTEMPTS: usize = 5;

// === Reconciliation ===

/// Price drift (in cents) tolerated before a line counts as "price changed".
pub const PRICE_TOLERANCE_CENTS: i64 = 1;

// === Field lengths ===

/// Buyer cookie max length.
pub const MAX_BUYER_COOKIE_LEN: usize = 1024;

/// Post URL max length.
pub const MAX_POST_URL_LEN: usize = 2048;

/// Customer stock number max length.
pub const MAX_STOCK_NUMBER_LEN: usize = 128;
