//! Notification store module.
//!
//! User-visible record of balance activity. Every entry is created by the
//! credits service alongside the mutation it describes; nothing else writes
//! here.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// What kind of balance activity a notification describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A credit top-up request was submitted
    Submitted,
    /// A credit top-up request was approved
    Approved,
    /// A credit top-up request was rejected
    Rejected,
    /// Credits were added directly (outside the request flow)
    Credited,
    /// Credits were deducted directly (purchase settlement)
    Debited,
    /// Session-level condition the customer should act on
    System,
}

/// A single user-facing notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

/// In-memory notification log, newest first.
#[derive(Debug, Default)]
pub struct NotificationStore {
    entries: RwLock<Vec<Notification>>,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Notification>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Notification>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a notification and return its id.
    pub fn push(
        &self,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        amount: Decimal,
    ) -> Uuid {
        let notification = Notification {
            id: Uuid::new_v4(),
            kind,
            title: title.into(),
            message: message.into(),
            amount,
            created_at: Utc::now(),
            read: false,
        };
        let id = notification.id;
        self.write().push(notification);
        id
    }

    /// All notifications, newest first.
    pub fn list(&self) -> Vec<Notification> {
        self.read().iter().rev().cloned().collect()
    }

    /// Number of notifications not yet marked read.
    pub fn unread_count(&self) -> usize {
        self.read().iter().filter(|n| !n.read).count()
    }

    /// Mark one notification read. Returns `false` if the id is unknown.
    pub fn mark_read(&self, id: Uuid) -> bool {
        let mut entries = self.write();
        match entries.iter_mut().find(|n| n.id == id) {
            Some(entry) => {
                entry.read = true;
                true
            }
            None => false,
        }
    }

    /// Mark every notification read.
    pub fn mark_all_read(&self) {
        for entry in self.write().iter_mut() {
            entry.read = true;
        }
    }

    /// Drop all notifications. Invoked on logout.
    pub fn clear(&self) {
        self.write().clear();
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
