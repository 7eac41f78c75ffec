use crate::domain::receipt::{PaymentReceipt, PaymentSubmission, ReceiptId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of a `system_notification` event.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Back-office employee record carried on employee lifecycle events.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub role: String,
}

/// Domain events carried on the bus, discriminated by the `event` tag.
///
/// Each variant carries its own typed payload, so subscribers can match on
/// the kind instead of poking at an untyped blob.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum RealtimeEvent {
    PaymentSubmitted {
        submission: PaymentSubmission,
        receipt: PaymentReceipt,
    },
    PaymentApproved {
        receipt_id: ReceiptId,
        admin_notes: Option<String>,
    },
    PaymentRejected {
        receipt_id: ReceiptId,
        admin_notes: String,
    },
    EmployeeCreated {
        employee: Employee,
    },
    EmployeeUpdated {
        employee: Employee,
    },
    EmployeeDeleted {
        employee_id: String,
    },
    SystemNotification {
        severity: Severity,
        message: String,
    },
}

impl RealtimeEvent {
    /// The wire tag of this event, for logging and filtering.
    pub fn name(&self) -> &'static str {
        match self {
            RealtimeEvent::PaymentSubmitted { .. } => "payment_submitted",
            RealtimeEvent::PaymentApproved { .. } => "payment_approved",
            RealtimeEvent::PaymentRejected { .. } => "payment_rejected",
            RealtimeEvent::EmployeeCreated { .. } => "employee_created",
            RealtimeEvent::EmployeeUpdated { .. } => "employee_updated",
            RealtimeEvent::EmployeeDeleted { .. } => "employee_deleted",
            RealtimeEvent::SystemNotification { .. } => "system_notification",
        }
    }
}

/// Envelope delivered to subscribers.
///
/// Ephemeral: exists only for the duration of one broadcast. The bus backfills
/// a missing timestamp before delivery so every subscriber observes the same
/// instant.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct RealtimePayload {
    #[serde(flatten)]
    pub event: RealtimeEvent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl RealtimePayload {
    /// Wraps an event with no timestamp; the bus stamps it at broadcast time.
    pub fn new(event: RealtimeEvent) -> Self {
        Self {
            event,
            timestamp: None,
        }
    }
}
