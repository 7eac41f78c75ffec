use crate::error::{KeyraError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Subscription tier a payment pays for.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Single,
    Monthly,
    Yearly,
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlanType::Single => "single",
            PlanType::Monthly => "monthly",
            PlanType::Yearly => "yearly",
        };
        write!(f, "{s}")
    }
}

/// Unique identifier of a payment receipt.
///
/// Generated as a millisecond timestamp plus a random suffix; unique within a
/// single process lifetime, which is all the pipeline requires.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone)]
#[serde(transparent)]
pub struct ReceiptId(String);

impl ReceiptId {
    pub fn generate() -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!("rcpt-{}-{}", Utc::now().timestamp_millis(), &suffix[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReceiptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ReceiptId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Lifecycle state of a payment receipt.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptStatus {
    Pending,
    Processing,
    Approved,
    Rejected,
    Failed,
}

impl ReceiptStatus {
    /// Terminal states admit no further transition (except re-recording the
    /// same decision, which callers use to re-emit the decision event).
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReceiptStatus::Approved | ReceiptStatus::Rejected)
    }

    /// Permitted transition graph:
    /// pending -> processing/approved/rejected/failed,
    /// processing -> approved/rejected/failed,
    /// failed -> approved/rejected (manual admin follow-up),
    /// approved -> approved and rejected -> rejected (same-decision repeat).
    pub fn can_transition_to(&self, next: ReceiptStatus) -> bool {
        use ReceiptStatus::*;
        matches!(
            (self, next),
            (Pending, Processing | Approved | Rejected | Failed)
                | (Processing, Approved | Rejected | Failed)
                | (Failed, Approved | Rejected)
                | (Approved, Approved)
                | (Rejected, Rejected)
        )
    }
}

impl fmt::Display for ReceiptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReceiptStatus::Pending => "pending",
            ReceiptStatus::Processing => "processing",
            ReceiptStatus::Approved => "approved",
            ReceiptStatus::Rejected => "rejected",
            ReceiptStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// A user's payment claim, as collected by the payment form.
///
/// Immutable once submitted. The pipeline performs presence-only validation;
/// amount positivity and plan membership are enforced upstream.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct PaymentSubmission {
    pub user_id: String,
    pub plan_type: PlanType,
    /// Amount in the smallest currency unit.
    pub amount: u64,
    /// Reference to the uploaded proof-of-payment image.
    pub receipt_url: String,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
}

/// Internal queue entry derived from a submission.
///
/// Lives only inside the processor's queue; destroyed once processed or
/// dropped after exhausting retries.
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub id: ReceiptId,
    pub submission: PaymentSubmission,
    pub timestamp: DateTime<Utc>,
}

/// The durable record of a user's claimed payment, pending admin verification.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct PaymentReceipt {
    pub id: ReceiptId,
    pub user_id: String,
    pub plan_type: PlanType,
    pub amount: u64,
    pub receipt_image_url: String,
    pub status: ReceiptStatus,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentReceipt {
    /// Builds a receipt in `pending` status from a fresh submission.
    pub fn from_submission(id: ReceiptId, submission: &PaymentSubmission) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id: submission.user_id.clone(),
            plan_type: submission.plan_type,
            amount: submission.amount,
            receipt_image_url: submission.receipt_url.clone(),
            status: ReceiptStatus::Pending,
            admin_notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a status transition, recording notes and bumping `updated_at`.
    ///
    /// Status transitions are the only permitted mutation after creation.
    pub fn transition(&mut self, next: ReceiptStatus, admin_notes: Option<String>) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(KeyraError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        if admin_notes.is_some() {
            self.admin_notes = admin_notes;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}
