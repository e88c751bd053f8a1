//! Gateway error type and its `IntoResponse` mapping (§7).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Errors an HTTP handler can surface, already carrying the status code
/// the error maps to.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Malformed or missing request data. Maps to 400.
    #[error("{0}")]
    Validation(String),

    /// The named resource does not exist. Maps to 404.
    #[error("{0}")]
    NotFound(String),

    /// A security policy check denied the request. Maps to 403.
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// No provider in the resolved fallback chain was available. Maps
    /// to 502.
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The provider went idle past the configured timeout. Maps to 504.
    #[error("Idle timeout: {0}")]
    IdleTimeout(String),

    /// Too many requests against a rate-limited route. Maps to 429.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Anything else: a bug, an I/O failure, a poisoned lock. Maps to
    /// 500 and is logged with full detail; the client only sees a
    /// generic message.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl GatewayError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::AccessDenied(_) => StatusCode::FORBIDDEN,
            Self::ProviderUnavailable(_) => StatusCode::BAD_GATEWAY,
            Self::IdleTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "internal gateway error");
            return (status, Json(json!({"error": "internal error"}))).into_response();
        }
        (status, Json(json!({"error": self.to_string()}))).into_response()
    }
}

/// Convenience alias for handler return types.
pub type GatewayResult<T> = Result<T, GatewayError>;
