//! Backend error types and HTTP conversions.
//!
//! `BackendError` is the single error type returned by HTTP handlers and
//! the federation workers. `types` defines the enum and its status-code
//! mapping; `conversion` implements `IntoResponse` so handlers can return
//! the error directly.

/// Error type definitions
pub mod types;

/// Conversions to HTTP responses
pub mod conversion;

pub use types::BackendError;
