use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A credit top-up submitted by the customer but not yet resolved by the
/// backend.
///
/// Only unresolved requests live in the wallet; approval and rejection both
/// remove the entry. The resolution itself is recorded in the notification
/// store, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRequest {
    /// Server-assigned request identifier, unique per request
    pub id: String,
    /// Requested credit amount, always positive
    pub amount: Decimal,
    /// When the request was recorded locally
    pub created_at: DateTime<Utc>,
}

/// Snapshot of the customer's credit state.
///
/// `balance` is authoritative once synced from the backend profile; the
/// projected balance (`balance` plus the sum of pending amounts) is always
/// derived on read and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceState {
    /// Confirmed credit balance
    pub balance: Decimal,
    /// Unresolved top-up requests
    pub pending: Vec<PendingRequest>,
    /// Last time `balance` was set from a trusted source
    pub last_updated: DateTime<Utc>,
    /// Whether an authoritative refresh is in flight; cleared by the next
    /// trusted balance write
    #[serde(default)]
    pub refreshing: bool,
}

impl Default for BalanceState {
    fn default() -> Self {
        Self {
            balance: Decimal::ZERO,
            pending: Vec::new(),
            last_updated: Utc::now(),
            refreshing: false,
        }
    }
}

impl BalanceState {
    /// Confirmed balance plus the sum of all pending request amounts.
    pub fn projected_balance(&self) -> Decimal {
        self.balance + self.pending.iter().map(|p| p.amount).sum::<Decimal>()
    }
}
