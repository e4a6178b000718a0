//! Session supervision.
//!
//! Owns the bearer token and the lifetime of the credit poller: sign-in
//! seeds the balance from the profile and starts polling, sign-out cancels
//! the task and wipes every piece of per-session state.

use crate::gateway::CreditsGateway;
use crate::notify::NotificationStore;
use crate::poller::CreditPoller;
use crate::service::CreditsService;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Shared bearer-token cell. The gateway reads it on every request; the
/// session layer is the only writer.
#[derive(Debug, Default)]
pub struct TokenStore {
    token: RwLock<Option<String>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, token: impl Into<String>) {
        *self
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(token.into());
    }

    pub fn clear(&self) {
        *self
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn get(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

/// Supervises the credits subsystem across sign-in and sign-out.
pub struct AccountSession {
    tokens: Arc<TokenStore>,
    gateway: Arc<dyn CreditsGateway>,
    service: Arc<CreditsService>,
    notifications: Arc<NotificationStore>,
    poller: Arc<CreditPoller>,
    active: Mutex<Option<(CancellationToken, JoinHandle<()>)>>,
}

impl AccountSession {
    pub fn new(
        tokens: Arc<TokenStore>,
        gateway: Arc<dyn CreditsGateway>,
        service: Arc<CreditsService>,
        notifications: Arc<NotificationStore>,
        poller: Arc<CreditPoller>,
    ) -> Self {
        Self {
            tokens,
            gateway,
            service,
            notifications,
            poller,
            active: Mutex::new(None),
        }
    }

    fn lock_active(
        &self,
    ) -> std::sync::MutexGuard<'_, Option<(CancellationToken, JoinHandle<()>)>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a poller task is currently running for this session.
    pub fn is_active(&self) -> bool {
        self.lock_active().is_some()
    }

    /// Sign in: store the token, seed the balance from the profile, and
    /// start the poller. Calling again while active is a no-op.
    pub async fn login(&self, token: impl Into<String>) {
        if self.is_active() {
            tracing::debug!("login ignored, session already active");
            return;
        }
        self.tokens.set(token);

        match self.gateway.profile().await {
            Ok(profile) => {
                tracing::info!(balance = %profile.balance, "session balance synced");
                self.service.sync_balance_from_session(profile.balance);
            }
            Err(error) => {
                // Not fatal: the poller still runs and the next profile
                // refresh will correct the balance.
                tracing::warn!(error = %error, "profile fetch failed at login");
            }
        }

        let cancel_token = CancellationToken::new();
        let handle = self.poller.clone().start(cancel_token.clone());
        *self.lock_active() = Some((cancel_token, handle));
    }

    /// Sign out: stop the poller and wipe all per-session state (token,
    /// both dedup layers, error counters, notifications). Safe to call when
    /// no session is active.
    pub async fn logout(&self) {
        let active = self.lock_active().take();
        if let Some((cancel_token, handle)) = active {
            cancel_token.cancel();
            if let Err(error) = handle.await {
                tracing::warn!(error = %error, "poller task ended abnormally");
            }
        }

        self.tokens.clear();
        self.poller.reset();
        self.service.clear_processed_requests();
        self.notifications.clear();
        tracing::info!("session closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_store_roundtrip() {
        let tokens = TokenStore::new();
        assert!(!tokens.is_authenticated());
        assert_eq!(tokens.get(), None);

        tokens.set("secret-token");
        assert!(tokens.is_authenticated());
        assert_eq!(tokens.get(), Some("secret-token".to_string()));

        tokens.clear();
        assert!(!tokens.is_authenticated());
    }

    #[test]
    fn test_token_store_overwrite() {
        let tokens = TokenStore::new();
        tokens.set("first");
        tokens.set("second");
        assert_eq!(tokens.get(), Some("second".to_string()));
    }
}
