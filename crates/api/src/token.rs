//! Bearer token issuance for redeemed PunchOut sessions.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use storefront_core::{ApplicationUser, Error, Result};
use uuid::Uuid;

/// JWT signing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// HMAC signing key
    #[serde(default)]
    pub key: String,
    #[serde(default = "default_issuer")]
    pub issuer: String,
    #[serde(default = "default_audience")]
    pub audience: String,
    #[serde(default = "default_expire_minutes")]
    pub expire_minutes: i64,
}

fn default_issuer() -> String {
    "punchout-storefront".to_string()
}

fn default_audience() -> String {
    "punchout-storefront".to_string()
}

fn default_expire_minutes() -> i64 {
    60
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            issuer: default_issuer(),
            audience: default_audience(),
            expire_minutes: default_expire_minutes(),
        }
    }
}

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// One entry per role
    #[serde(rename = "role", default)]
    pub roles: Vec<String>,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// A signed token and its lifetime.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_in: i64,
    pub claims: Claims,
}

/// Signs HS256 access tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    config: JwtConfig,
    key: EncodingKey,
}

impl TokenIssuer {
    pub fn new(config: JwtConfig) -> Result<Self> {
        if config.key.is_empty() {
            return Err(Error::configuration("jwt.key must be set"));
        }
        if config.expire_minutes <= 0 {
            return Err(Error::configuration(format!(
                "jwt.expire_minutes must be positive, got {}",
                config.expire_minutes
            )));
        }

        Ok(Self {
            key: EncodingKey::from_secret(config.key.as_bytes()),
            config,
        })
    }

    /// Token lifetime in seconds.
    pub fn expires_in(&self) -> i64 {
        self.config.expire_minutes * 60
    }

    pub fn claims_for(&self, user: &ApplicationUser, now: DateTime<Utc>) -> Claims {
        Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            given_name: user.given_name.clone(),
            family_name: user.family_name.clone(),
            client_id: user.client_id.map(|c| c.to_string()),
            roles: user.roles.clone(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(self.config.expire_minutes)).timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    pub fn issue(&self, user: &ApplicationUser, now: DateTime<Utc>) -> Result<IssuedToken> {
        let claims = self.claims_for(user, now);
        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.key)
            .map_err(|e| Error::token(format!("Failed to sign access token: {}", e)))?;

        Ok(IssuedToken {
            access_token,
            expires_in: self.expires_in(),
            claims,
        })
    }
}
