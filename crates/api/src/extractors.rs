//! Request extractors.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use punchout::LogContext;

/// Client IP address.
#[derive(Debug, Clone)]
pub struct ClientIp(pub Option<String>);

impl ClientIp {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        // Take the first hop of X-Forwarded-For
        if let Some(xff) = headers.get("X-Forwarded-For").and_then(|h| h.to_str().ok()) {
            if let Some(ip) = xff.split(',').next().map(str::trim).filter(|ip| !ip.is_empty()) {
                return ClientIp(Some(ip.to_string()));
            }
        }

        if let Some(ip) = headers.get("X-Real-IP").and_then(|h| h.to_str().ok()) {
            return ClientIp(Some(ip.trim().to_string()));
        }

        ClientIp(None)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

/// Request metadata attached to every error-log entry.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: String,
    pub path: String,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestContext {
    pub fn log_context(&self) -> LogContext {
        let mut context = LogContext::new();
        context.insert("request_method".into(), self.method.clone());
        context.insert("request_path".into(), self.path.clone());
        if let Some(ip) = &self.client_ip {
            context.insert("client_ip".into(), ip.clone());
        }
        if let Some(agent) = &self.user_agent {
            context.insert("user_agent".into(), agent.clone());
        }
        context
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(RequestContext {
            method: parts.method.to_string(),
            path: parts.uri.path().to_string(),
            client_ip: ClientIp::from_headers(&parts.headers).0,
            user_agent: parts
                .headers
                .get(header::USER_AGENT)
                .and_then(|h| h.to_str().ok())
                .map(String::from),
        })
    }
}
