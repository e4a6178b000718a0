//! Wallet store module.
//!
//! Holds the customer's confirmed credit balance and in-flight top-up
//! requests. This is a pure, synchronous state container: the only two
//! primitive transitions are balance writes and pending-entry resolution,
//! and it performs no I/O.

mod state;

pub use state::*;

use rust_decimal::Decimal;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// The wallet store is the single source of truth for credit state.
///
/// All mutators take `&self`; callers share the store behind an `Arc`. The
/// store itself never rejects an operation (missing ids are no-ops), which
/// keeps the mutation surface, the credits service, in charge of validation
/// and logging.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use souk::wallet::WalletStore;
///
/// let wallet = WalletStore::new();
/// wallet.set_balance(Decimal::from(50));
/// wallet.add_pending("req-1", Decimal::from(20));
///
/// assert_eq!(wallet.balance(), Decimal::from(50));
/// assert_eq!(wallet.projected_balance(), Decimal::from(70));
/// ```
#[derive(Debug, Default)]
pub struct WalletStore {
    state: RwLock<BalanceState>,
}

impl WalletStore {
    /// Create an empty wallet (zero balance, no pending requests).
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, BalanceState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BalanceState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Overwrite the confirmed balance from a trusted source (profile fetch,
    /// session sync). Refreshes `last_updated` and ends any refresh in
    /// flight.
    pub fn set_balance(&self, value: Decimal) {
        let mut state = self.write();
        state.balance = value;
        state.last_updated = chrono::Utc::now();
        state.refreshing = false;
    }

    /// Flag that an authoritative refresh has started, so the UI can show
    /// the balance as provisional until the next trusted write.
    pub fn mark_refreshing(&self) {
        self.write().refreshing = true;
    }

    /// Whether an authoritative refresh is in flight.
    pub fn is_refreshing(&self) -> bool {
        self.read().refreshing
    }

    /// Apply a signed delta to the confirmed balance.
    ///
    /// Used for direct adjustments outside the pending-request flow, such as
    /// a purchase settlement or a server-origin approval with no local
    /// pending record.
    pub fn update_balance(&self, delta: Decimal) {
        let mut state = self.write();
        state.balance += delta;
        state.last_updated = chrono::Utc::now();
    }

    /// Record a new pending top-up request.
    ///
    /// Returns `true` if the entry was inserted. Duplicate ids and
    /// non-positive amounts are no-ops, so a double-submit cannot create two
    /// entries.
    pub fn add_pending(&self, id: &str, amount: Decimal) -> bool {
        if amount <= Decimal::ZERO {
            return false;
        }
        let mut state = self.write();
        if state.pending.iter().any(|p| p.id == id) {
            return false;
        }
        state.pending.push(PendingRequest {
            id: id.to_string(),
            amount,
            created_at: chrono::Utc::now(),
        });
        true
    }

    /// Resolve a pending request as approved: remove the entry and credit
    /// its amount to the balance.
    ///
    /// Returns the credited amount, or `None` when no entry with this id
    /// exists (the caller falls back to a direct `update_balance`).
    pub fn approve_pending(&self, id: &str) -> Option<Decimal> {
        let mut state = self.write();
        let idx = state.pending.iter().position(|p| p.id == id)?;
        let entry = state.pending.remove(idx);
        state.balance += entry.amount;
        state.last_updated = chrono::Utc::now();
        Some(entry.amount)
    }

    /// Resolve a pending request as rejected: remove the entry without
    /// touching the balance.
    ///
    /// Returns the removed amount if an entry existed.
    pub fn reject_pending(&self, id: &str) -> Option<Decimal> {
        let mut state = self.write();
        let idx = state.pending.iter().position(|p| p.id == id)?;
        Some(state.pending.remove(idx).amount)
    }

    /// Amount of the pending request with this id, if present.
    pub fn pending_amount(&self, id: &str) -> Option<Decimal> {
        self.read()
            .pending
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.amount)
    }

    /// Confirmed balance.
    pub fn balance(&self) -> Decimal {
        self.read().balance
    }

    /// Confirmed balance plus the sum of pending amounts. Always derived,
    /// never cached.
    pub fn projected_balance(&self) -> Decimal {
        self.read().projected_balance()
    }

    /// Cloned list of unresolved requests.
    pub fn pending_requests(&self) -> Vec<PendingRequest> {
        self.read().pending.clone()
    }

    /// Number of unresolved requests.
    pub fn pending_count(&self) -> usize {
        self.read().pending.len()
    }

    /// Full snapshot of the current state, for UI consumption.
    pub fn snapshot(&self) -> BalanceState {
        self.read().clone()
    }
}
