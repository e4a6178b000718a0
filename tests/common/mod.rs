//! Shared helpers for integration tests.

use souk::notify::NotificationStore;
use souk::service::CreditsService;
use souk::wallet::WalletStore;
use std::sync::Arc;

pub struct Stack {
    pub wallet: Arc<WalletStore>,
    pub notifications: Arc<NotificationStore>,
    pub service: Arc<CreditsService>,
}

/// Build a wallet + notification + service stack.
pub fn stack() -> Stack {
    let wallet = Arc::new(WalletStore::new());
    let notifications = Arc::new(NotificationStore::new());
    let service = Arc::new(CreditsService::new(wallet.clone(), notifications.clone()));
    Stack {
        wallet,
        notifications,
        service,
    }
}
