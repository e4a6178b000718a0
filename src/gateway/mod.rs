//! Storefront backend gateway.
//!
//! The credits path talks to the remote REST API through the
//! [`CreditsGateway`] trait so the poller and session layer can be exercised
//! against in-process fakes. [`HttpGateway`] is the production
//! implementation.

mod error;
mod http;
mod types;

pub use error::*;
pub use http::*;
pub use types::*;

use async_trait::async_trait;

/// Access to the credits endpoints of the storefront backend.
#[async_trait]
pub trait CreditsGateway: Send + Sync {
    /// Fetch the pending credit notification events for the signed-in
    /// customer. A non-2xx status or a non-array body is an error.
    async fn credit_events(&self) -> Result<Vec<CreditEvent>, GatewayError>;

    /// Acknowledge a delivered notification event. Best-effort; callers log
    /// failures and never retry or roll back local state.
    async fn acknowledge(&self, notification_id: i64) -> Result<(), GatewayError>;

    /// Fetch the customer profile (authoritative balance).
    async fn profile(&self) -> Result<UserProfile, GatewayError>;
}
