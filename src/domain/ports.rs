use super::event::{Employee, RealtimeEvent, RealtimePayload, Severity};
use super::receipt::{PaymentReceipt, PaymentRequest, PaymentSubmission, ReceiptId, ReceiptStatus};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Durability boundary for payment receipts.
///
/// The processor's queue is not durable; receipts are persisted through this
/// port at submission time, and status transitions are the only permitted
/// mutation afterwards.
#[async_trait]
pub trait ReceiptStore: Send + Sync {
    async fn save(&self, receipt: PaymentReceipt) -> Result<()>;
    /// Applies a status transition and returns the updated receipt.
    async fn update_status(
        &self,
        id: &ReceiptId,
        status: ReceiptStatus,
        admin_notes: Option<String>,
    ) -> Result<PaymentReceipt>;
    async fn find_by_id(&self, id: &ReceiptId) -> Result<Option<PaymentReceipt>>;
    /// Receipts still awaiting an admin decision (pending, processing, failed).
    async fn list_pending(&self) -> Result<Vec<PaymentReceipt>>;
    async fn list_all(&self) -> Result<Vec<PaymentReceipt>>;
}

/// The backend processing step for a queued payment request.
///
/// Adapters own latency and failure behavior; failures are treated as
/// transient and retried by the processor up to its ceiling.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn process(&self, request: &PaymentRequest) -> Result<()>;
}

/// Outbound side of the event bus.
///
/// The typed emitters standardize event names and payload shapes across
/// producers; they construct payloads and nothing else.
pub trait EventSink: Send + Sync {
    fn broadcast(&self, payload: RealtimePayload);

    fn notify_payment_submitted(&self, submission: &PaymentSubmission, receipt: &PaymentReceipt) {
        self.broadcast(RealtimePayload::new(RealtimeEvent::PaymentSubmitted {
            submission: submission.clone(),
            receipt: receipt.clone(),
        }));
    }

    fn notify_payment_approved(&self, receipt_id: &ReceiptId, admin_notes: Option<String>) {
        self.broadcast(RealtimePayload::new(RealtimeEvent::PaymentApproved {
            receipt_id: receipt_id.clone(),
            admin_notes,
        }));
    }

    fn notify_payment_rejected(&self, receipt_id: &ReceiptId, admin_notes: String) {
        self.broadcast(RealtimePayload::new(RealtimeEvent::PaymentRejected {
            receipt_id: receipt_id.clone(),
            admin_notes,
        }));
    }

    fn notify_employee_created(&self, employee: Employee) {
        self.broadcast(RealtimePayload::new(RealtimeEvent::EmployeeCreated {
            employee,
        }));
    }

    fn notify_employee_updated(&self, employee: Employee) {
        self.broadcast(RealtimePayload::new(RealtimeEvent::EmployeeUpdated {
            employee,
        }));
    }

    fn notify_employee_deleted(&self, employee_id: String) {
        self.broadcast(RealtimePayload::new(RealtimeEvent::EmployeeDeleted {
            employee_id,
        }));
    }

    fn notify_system(&self, severity: Severity, message: String) {
        self.broadcast(RealtimePayload::new(RealtimeEvent::SystemNotification {
            severity,
            message,
        }));
    }
}

pub type ReceiptStoreRef = Arc<dyn ReceiptStore>;
pub type PaymentGatewayRef = Arc<dyn PaymentGateway>;
pub type EventSinkRef = Arc<dyn EventSink>;
