//! Credits service façade.
//!
//! The single authorized mutation surface over the wallet store. Every
//! balance change flows through here, paired with a user-visible
//! notification, and externally observed credit events are applied at most
//! once no matter how many call sites deliver them.
//!
//! All operations are synchronous and local. Invalid input aborts the one
//! operation with an error log instead of returning an error, because the
//! call sites are fire-and-forget event handlers with nowhere to propagate
//! a failure.


use crate::dedup::{ProcessedLog, LOG_HIGH_WATER, LOG_RETAIN};
use crate::notify::{NotificationKind, NotificationStore};
use crate::wallet::WalletStore;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Façade over the wallet and notification stores.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use souk::notify::NotificationStore;
/// use souk::service::CreditsService;
/// use souk::wallet::WalletStore;
/// use std::sync::Arc;
///
/// let wallet = Arc::new(WalletStore::new());
/// let notifications = Arc::new(NotificationStore::new());
/// let service = CreditsService::new(wallet.clone(), notifications);
///
/// service.sync_balance_from_session(Decimal::from(50));
/// service.add_pending_request("req-1", Decimal::from(20));
/// assert_eq!(wallet.projected_balance(), Decimal::from(70));
///
/// // Delivered twice, applied once.
/// service.approve_credit_request("req-1", Some(Decimal::from(20)));
/// service.approve_credit_request("req-1", Some(Decimal::from(20)));
/// assert_eq!(wallet.balance(), Decimal::from(70));
/// ```
pub struct CreditsService {
    wallet: Arc<WalletStore>,
    notifications: Arc<NotificationStore>,
    /// Request ids whose approval has already been applied. This set, not
    /// the poller's event log, is the authoritative at-most-once boundary:
    /// approvals can arrive through call sites other than the poller.
    processed: ProcessedLog,
}

impl CreditsService {
    pub fn new(wallet: Arc<WalletStore>, notifications: Arc<NotificationStore>) -> Self {
        Self {
            wallet,
            notifications,
            processed: ProcessedLog::new(),
        }
    }

    /// Record a freshly submitted top-up request and tell the customer.
    ///
    /// `request_id` must be the server-issued id; a duplicate submission is
    /// absorbed without a second notification.
    pub fn add_pending_request(&self, request_id: &str, amount: Decimal) {
        if request_id.is_empty() {
            tracing::error!("ignoring pending request with empty id");
            return;
        }
        if amount <= Decimal::ZERO {
            tracing::error!(request_id, %amount, "ignoring pending request with non-positive amount");
            return;
        }
        if !self.wallet.add_pending(request_id, amount) {
            tracing::debug!(request_id, "pending request already recorded");
            return;
        }
        tracing::info!(request_id, %amount, "credit request submitted");
        self.notifications.push(
            NotificationKind::Submitted,
            "Credit Request Submitted",
            format!("Your credit request of ${amount} is being reviewed."),
            amount,
        );
    }

    /// Apply a credit approval observed from the backend.
    ///
    /// Guarantees at-most-once effect per `request_id`: the id is marked
    /// processed before any mutation, so a duplicate or re-entrant delivery
    /// sees the mark and returns. The explicit `amount` wins when positive;
    /// otherwise the amount of the matching pending request is used. When
    /// neither yields a positive amount the id is unmarked again so a later
    /// valid event can retry, and nothing changes.
    pub fn approve_credit_request(&self, request_id: &str, amount: Option<Decimal>) {
        if request_id.is_empty() {
            tracing::error!("ignoring credit approval with empty request id");
            return;
        }
        if !self.processed.insert(request_id) {
            tracing::debug!(request_id, "credit approval already processed");
            return;
        }

        let resolved = amount
            .filter(|a| *a > Decimal::ZERO)
            .or_else(|| self.wallet.pending_amount(request_id));
        let resolved = match resolved {
            Some(a) if a > Decimal::ZERO => a,
            _ => {
                self.processed.remove(request_id);
                tracing::error!(request_id, "credit approval carried no usable amount");
                return;
            }
        };

        match self.wallet.approve_pending(request_id) {
            Some(credited) => {
                tracing::info!(request_id, amount = %credited, "pending credit request approved");
            }
            None => {
                // Server-origin approval the client never registered locally.
                self.wallet.update_balance(resolved);
                tracing::info!(request_id, amount = %resolved, "credit approved without local pending record");
            }
        }

        self.notifications.push(
            NotificationKind::Approved,
            "Credit Request Approved",
            format!("${resolved} has been added to your credit balance."),
            resolved,
        );
    }

    /// Apply a credit rejection observed from the backend. Removes the
    /// pending entry if one exists; the balance is never touched.
    pub fn reject_credit_request(&self, request_id: &str) {
        if request_id.is_empty() {
            tracing::error!("ignoring credit rejection with empty request id");
            return;
        }

        let amount = self.wallet.reject_pending(request_id).unwrap_or(Decimal::ZERO);
        tracing::info!(request_id, %amount, "credit request rejected");
        self.notifications.push(
            NotificationKind::Rejected,
            "Credit Request Rejected",
            format!("Your credit request of ${amount} was declined."),
            amount,
        );
    }

    /// Authoritative balance overwrite after a fresh profile fetch.
    pub fn set_balance(&self, new_balance: Decimal) {
        self.wallet.set_balance(new_balance);
    }

    /// Trust the session layer's view of the balance now.
    pub fn sync_balance_from_session(&self, balance: Decimal) {
        self.set_balance(balance);
    }

    /// Direct credit outside the pending-request flow.
    pub fn add_to_balance(&self, amount: Decimal) {
        if amount <= Decimal::ZERO {
            tracing::error!(%amount, "ignoring non-positive credit");
            return;
        }
        self.wallet.update_balance(amount);
        self.notifications.push(
            NotificationKind::Credited,
            "Credits Added",
            format!("${amount} has been added to your credit balance."),
            amount,
        );
    }

    /// Direct debit, e.g. a purchase settled with credits.
    pub fn deduct_from_balance(&self, amount: Decimal, description: Option<&str>) {
        if amount <= Decimal::ZERO {
            tracing::error!(%amount, "ignoring non-positive deduction");
            return;
        }
        self.wallet.update_balance(-amount);
        let message = match description {
            Some(text) => text.to_string(),
            None => format!("${amount} was deducted from your credit balance."),
        };
        self.notifications
            .push(NotificationKind::Debited, "Credits Used", message, amount);
    }

    /// Whether the confirmed balance covers `amount`.
    pub fn has_sufficient_balance(&self, amount: Decimal) -> bool {
        self.wallet.balance() >= amount
    }

    /// Tell the customer that live updates have stopped for this session.
    /// Called once by the poller when it fail-stops.
    pub fn report_sync_stalled(&self) {
        self.notifications.push(
            NotificationKind::System,
            "Connection Lost",
            "Live balance updates are paused. Please refresh the page.",
            Decimal::ZERO,
        );
    }

    /// Bound the processed-id set. Runs on the cleanup timer; the only
    /// observable effect is that very old ids become eligible again.
    pub fn cleanup_processed_requests(&self) {
        self.processed.trim(LOG_HIGH_WATER, LOG_RETAIN);
    }

    /// Wipe the processed-id set. Invoked on logout.
    pub fn clear_processed_requests(&self) {
        self.processed.clear();
    }

    /// Number of request ids currently held in the processed set.
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }
}
