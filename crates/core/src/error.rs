//! Unified error types for the PunchOut storefront.
//!
//! Error codes:
//! - CXML_001-008: Malformed or incomplete cXML input
//! - AUTH_001-006: Authentication and identity binding failures
//! - RES_001-002: Missing resources (carts, sessions)
//! - CONFLICT_001: Duplicate session id
//! - INTERNAL_001: Unexpected failures
//! - REQUEST_001: Unreadable JSON request body (login bridge)

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse failure class used by the error log and response mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    MalformedInput,
    AuthenticationFailure,
    ResourceMissing,
    ReconciliationGap,
    InternalFailure,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MalformedInput => "malformed_input",
            Self::AuthenticationFailure => "authentication_failure",
            Self::ResourceMissing => "resource_missing",
            Self::ReconciliationGap => "reconciliation_gap",
            Self::InternalFailure => "internal_failure",
        }
    }
}

/// Malformed input error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputErrorCode {
    /// CXML_001: Body is not a parseable cXML document
    Unparseable,
    /// CXML_002: Header element missing
    MissingHeader,
    /// CXML_003: No DUNS/NetworkID sender identity
    MissingSender,
    /// CXML_004: No shared secret credential
    MissingCredential,
    /// CXML_005: No Ariba user identity
    MissingUserIdentity,
    /// CXML_006: No UserEmail extrinsic
    MissingEmail,
    /// CXML_007: No user with the supplied email
    UnknownUser,
    /// CXML_008: Request or PunchOutSetupRequest missing/invalid
    InvalidRequest,
}

impl InputErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unparseable => "CXML_001",
            Self::MissingHeader => "CXML_002",
            Self::MissingSender => "CXML_003",
            Self::MissingCredential => "CXML_004",
            Self::MissingUserIdentity => "CXML_005",
            Self::MissingEmail => "CXML_006",
            Self::UnknownUser => "CXML_007",
            Self::InvalidRequest => "CXML_008",
        }
    }

    /// Get the HTTP status code.
    pub fn http_status(&self) -> u16 {
        400
    }
}

/// Authentication error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorCode {
    /// AUTH_001: Shared secret not configured on this side
    SecretNotConfigured,
    /// AUTH_002: Supplied shared secret is empty
    SecretMissing,
    /// AUTH_003: Shared secret mismatch
    SecretMismatch,
    /// AUTH_004: Ariba identity does not match the user's binding
    IdentityMismatch,
    /// AUTH_005: PunchOut session expired
    SessionExpired,
    /// AUTH_006: Session bound to a user that no longer exists
    SessionUserMissing,
}

impl AuthErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::SecretNotConfigured => "AUTH_001",
            Self::SecretMissing => "AUTH_002",
            Self::SecretMismatch => "AUTH_003",
            Self::IdentityMismatch => "AUTH_004",
            Self::SessionExpired => "AUTH_005",
            Self::SessionUserMissing => "AUTH_006",
        }
    }

    /// Get the HTTP status code.
    pub fn http_status(&self) -> u16 {
        401
    }
}

/// Resource error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceErrorCode {
    /// RES_001: Shopping cart not found
    CartNotFound,
    /// RES_002: PunchOut session not found
    SessionNotFound,
}

impl ResourceErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::CartNotFound => "RES_001",
            Self::SessionNotFound => "RES_002",
        }
    }

    /// Get the HTTP status code.
    pub fn http_status(&self) -> u16 {
        400
    }
}

/// Unified error type for the storefront.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or incomplete input.
    #[error("[{code}] {message}")]
    MalformedInput {
        code: &'static str,
        message: String,
        http_status: u16,
    },

    /// Authentication or authorization failure.
    #[error("[{code}] {message}")]
    Auth {
        code: &'static str,
        message: String,
        http_status: u16,
    },

    /// Missing resource.
    #[error("[{code}] {message}")]
    Resource {
        code: &'static str,
        message: String,
        http_status: u16,
    },

    #[error("[CONFLICT_001] {0}")]
    Conflict(String),

    #[error("xml error: {0}")]
    Xml(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(String),

    #[error("token error: {0}")]
    Token(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a malformed-input error.
    pub fn input(code: InputErrorCode, msg: impl Into<String>) -> Self {
        Self::MalformedInput {
            code: code.code(),
            message: msg.into(),
            http_status: code.http_status(),
        }
    }

    /// Create an authentication error.
    pub fn auth(code: AuthErrorCode, msg: impl Into<String>) -> Self {
        Self::Auth {
            code: code.code(),
            message: msg.into(),
            http_status: code.http_status(),
        }
    }

    /// Create a resource error.
    pub fn resource(code: ResourceErrorCode, msg: impl Into<String>) -> Self {
        Self::Resource {
            code: code.code(),
            message: msg.into(),
            http_status: code.http_status(),
        }
    }

    /// Overrides the HTTP status of a resource error.
    ///
    /// The same missing resource is a 400 on one endpoint and a 401 on another.
    pub fn with_status(self, status: u16) -> Self {
        match self {
            Self::Resource { code, message, .. } => Self::Resource {
                code,
                message,
                http_status: status,
            },
            other => other,
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn xml(msg: impl Into<String>) -> Self {
        Self::Xml(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn token(msg: impl Into<String>) -> Self {
        Self::Token(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::MalformedInput { http_status, .. } => *http_status,
            Self::Auth { http_status, .. } => *http_status,
            Self::Resource { http_status, .. } => *http_status,
            Self::Conflict(_) => 409,
            Self::Xml(_) => 500,
            Self::Serialization(_) => 500,
            Self::Database(_) => 500,
            Self::Token(_) => 500,
            Self::Configuration(_) => 500,
            Self::Internal(_) => 500,
        }
    }

    /// Get the error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MalformedInput { code, .. } => code,
            Self::Auth { code, .. } => code,
            Self::Resource { code, .. } => code,
            Self::Conflict(_) => "CONFLICT_001",
            _ => "INTERNAL_001",
        }
    }

    /// Message safe to hand back to the caller.
    ///
    /// Internal failures are reduced to a generic text.
    pub fn public_message(&self) -> String {
        match self {
            Self::MalformedInput { message, .. }
            | Self::Auth { message, .. }
            | Self::Resource { message, .. } => message.clone(),
            Self::Conflict(msg) => msg.clone(),
            _ => "Internal server error".to_string(),
        }
    }

    /// Failure class of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MalformedInput { .. } => ErrorCategory::MalformedInput,
            Self::Auth { .. } => ErrorCategory::AuthenticationFailure,
            Self::Resource { .. } => ErrorCategory::ResourceMissing,
            _ => ErrorCategory::InternalFailure,
        }
    }
}
