//! Error types for backend gateway operations.

use thiserror::Error;

/// Errors that can occur talking to the storefront backend.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// Request exceeded its deadline.
    #[error("request timeout after {0}s")]
    Timeout(u64),

    /// Network connectivity error (DNS, connection refused, etc.).
    #[error("connection failed: {0}")]
    Connection(String),

    /// Backend returned an error status (4xx, 5xx).
    #[error("HTTP error: {0}")]
    Http(u16),

    /// Backend response doesn't match the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// No bearer token is available; the session is not signed in.
    #[error("no session token available")]
    Unauthenticated,
}
