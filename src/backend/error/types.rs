//! Backend Error Types
//!
//! This module defines error types used in HTTP handlers and the federation
//! workers. Each variant maps to an HTTP response via `status_code()` and
//! the `IntoResponse` implementation in `conversion`.
//!
//! # Error Categories
//!
//! - Handler errors: bad input, missing resources, rejected requests
//! - Revocation: a provider withdrew this instance's read access; carried
//!   as a dedicated variant so batch sync can log it distinctly and the
//!   provider surface can emit the distinguished error code
//! - Remote errors: a pull or registration against a remote instance failed
//! - Infrastructure errors: database, outbound HTTP, serialization

use axum::http::StatusCode;
use thiserror::Error;

use crate::shared::federation::ERR_SUBSCRIPTION_REVOKED;

/// Backend-specific error types
///
/// This enum represents all possible errors that can occur in the backend.
/// Each variant can be converted to an HTTP response.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error (e.g., missing fields, unknown resource)
    #[error("Handler error: {message}")]
    Handler {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// The provider explicitly revoked the subscription identified here.
    ///
    /// Raised consumer-side after revocation state has been applied, and
    /// provider-side when an inactive subscriber presents itself. Always
    /// rendered as 403 with the `ERR_SUBSCRIPTION_REVOKED` error code.
    #[error("Subscription revoked: {context}")]
    SubscriptionRevoked { context: String },

    /// A remote instance answered a pull or registration with a
    /// non-success status that is not a recognized revocation.
    #[error("Remote instance rejected request with status {status}")]
    RemoteRejected { status: u16 },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Outbound HTTP error (timeout, connection refused, bad body)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Handler {
            status,
            message: message.into(),
        }
    }

    /// Shorthand for a 400 validation failure
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::BAD_REQUEST, message)
    }

    /// Shorthand for a 404
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::NOT_FOUND, message)
    }

    /// Create a revocation error carrying context for logs
    pub fn revoked(context: impl Into<String>) -> Self {
        Self::SubscriptionRevoked {
            context: context.into(),
        }
    }

    /// Whether this error is an explicit revocation (as opposed to a
    /// transient network or database failure)
    pub fn is_revocation(&self) -> bool {
        matches!(self, Self::SubscriptionRevoked { .. })
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `Handler` - uses the status code from the error
    /// - `SubscriptionRevoked` - 403 Forbidden
    /// - `RemoteRejected` / `Http` - 502 Bad Gateway
    /// - `Database` / `Serialization` - 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Handler { status, .. } => *status,
            Self::SubscriptionRevoked { .. } => StatusCode::FORBIDDEN,
            Self::RemoteRejected { .. } => StatusCode::BAD_GATEWAY,
            Self::Http(_) => StatusCode::BAD_GATEWAY,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error message as it appears in the response body.
    ///
    /// Revocations use the fixed error code so consumers can match on it.
    pub fn message(&self) -> String {
        match self {
            Self::Handler { message, .. } => message.clone(),
            Self::SubscriptionRevoked { .. } => ERR_SUBSCRIPTION_REVOKED.to_string(),
            Self::RemoteRejected { status } => {
                format!("Remote instance rejected request with status {status}")
            }
            Self::Database(err) => err.to_string(),
            Self::Http(err) => err.to_string(),
            Self::Serialization(err) => err.to_string(),
        }
    }
}
