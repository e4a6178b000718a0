use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Server-side credit event type.
///
/// The wire value is an open string set; anything unrecognized decodes to
/// `Unknown` and is logged without mutating state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    CreditApproved,
    CreditRejected,
    CreditPending,
    #[serde(other)]
    Unknown,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::CreditApproved => "credit_approved",
            EventKind::CreditRejected => "credit_rejected",
            EventKind::CreditPending => "credit_pending",
            EventKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A credit notification event as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditEvent {
    /// Backend notification id (distinct from the request id)
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Correlates to the pending request this event resolves
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl CreditEvent {
    /// Identity key for deduplication.
    ///
    /// Two events are the same logical occurrence iff request id, type, and
    /// notification id all match. Events without a request id carry no
    /// actionable correlation and have no key.
    pub fn dedup_key(&self) -> Option<String> {
        let request_id = self.request_id.as_deref()?;
        if request_id.is_empty() {
            return None;
        }
        Some(format!("{}-{}-{}", request_id, self.kind, self.id))
    }
}

/// Customer profile as returned by the backend. Only the balance matters to
/// the credits path; the rest is carried for the account UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub balance: Decimal,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}
