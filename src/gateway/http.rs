//! HTTP implementation of the credits gateway.

use super::{CreditEvent, CreditsGateway, GatewayError, UserProfile};
use crate::config::ApiConfig;
use crate::session::TokenStore;
use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// `reqwest`-backed gateway to the storefront REST API.
///
/// Every request carries the session bearer token; the credits feed is
/// additionally requested with cache-disabled headers so intermediaries
/// never serve a stale event list.
pub struct HttpGateway {
    /// Shared HTTP client with connection pooling
    client: Client,
    /// Base URL without trailing slash (e.g., "https://store.example.com/api")
    base_url: String,
    /// Locale path segment ("en" or "ar")
    locale: String,
    /// Session token source
    tokens: Arc<TokenStore>,
    /// Per-request deadline
    timeout: Duration,
}

impl HttpGateway {
    /// Create a gateway with a default HTTP client.
    pub fn new(api: &ApiConfig, timeout_seconds: u64, tokens: Arc<TokenStore>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .expect("Failed to build HTTP client");
        Self::with_client(api, timeout_seconds, tokens, client)
    }

    /// Create a gateway with a custom HTTP client (for testing).
    pub fn with_client(
        api: &ApiConfig,
        timeout_seconds: u64,
        tokens: Arc<TokenStore>,
        client: Client,
    ) -> Self {
        Self {
            client,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            locale: api.locale.as_str().to_string(),
            tokens,
            timeout: Duration::from_secs(timeout_seconds),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}{}", self.base_url, self.locale, path)
    }

    fn bearer(&self) -> Result<String, GatewayError> {
        self.tokens.get().ok_or(GatewayError::Unauthenticated)
    }

    /// Classify a reqwest error into a GatewayError.
    fn classify_error(e: reqwest::Error, timeout_seconds: u64) -> GatewayError {
        if e.is_timeout() {
            GatewayError::Timeout(timeout_seconds)
        } else {
            GatewayError::Connection(e.to_string())
        }
    }
}

#[async_trait]
impl CreditsGateway for HttpGateway {
    async fn credit_events(&self) -> Result<Vec<CreditEvent>, GatewayError> {
        let token = self.bearer()?;
        let timeout_seconds = self.timeout.as_secs();

        let response = self
            .client
            .get(self.url("/user/notifications/credits"))
            .bearer_auth(token)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| Self::classify_error(e, timeout_seconds))?;

        if !response.status().is_success() {
            return Err(GatewayError::Http(response.status().as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        // The endpoint contract is a JSON array. Anything else is treated
        // like a transport failure; a malformed element inside an otherwise
        // valid array only drops that element.
        let raw: Vec<serde_json::Value> = serde_json::from_str(&body)
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        let events = raw
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<CreditEvent>(value) {
                Ok(event) => Some(event),
                Err(e) => {
                    tracing::warn!(error = %e, "dropping malformed credit event");
                    None
                }
            })
            .collect();

        Ok(events)
    }

    async fn acknowledge(&self, notification_id: i64) -> Result<(), GatewayError> {
        let token = self.bearer()?;
        let timeout_seconds = self.timeout.as_secs();

        let response = self
            .client
            .post(self.url(&format!("/user/notifications/{notification_id}/acknowledge")))
            .bearer_auth(token)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| Self::classify_error(e, timeout_seconds))?;

        if !response.status().is_success() {
            return Err(GatewayError::Http(response.status().as_u16()));
        }
        Ok(())
    }

    async fn profile(&self) -> Result<UserProfile, GatewayError> {
        let token = self.bearer()?;
        let timeout_seconds = self.timeout.as_secs();

        let response = self
            .client
            .get(self.url("/user/profile"))
            .bearer_auth(token)
            .header(CACHE_CONTROL, "no-cache")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| Self::classify_error(e, timeout_seconds))?;

        if !response.status().is_success() {
            return Err(GatewayError::Http(response.status().as_u16()));
        }

        response
            .json::<UserProfile>()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }
}
