use crate::domain::event::Severity;
use crate::domain::ports::{EventSinkRef, PaymentGatewayRef, ReceiptStoreRef};
use crate::domain::receipt::{PaymentReceipt, PaymentRequest, PaymentSubmission, ReceiptId, ReceiptStatus};
use crate::error::Result;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Maximum processing attempts per queued request before it is dropped.
const MAX_ATTEMPTS: u32 = 3;

/// Tunable delays of the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct ProcessorConfig {
    /// Pause between dequeues, so a drain never monopolizes the runtime.
    pub drain_delay: Duration,
    /// Simulated latency of an admin decision.
    pub decision_delay: Duration,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            drain_delay: Duration::from_millis(50),
            decision_delay: Duration::from_millis(25),
        }
    }
}

/// Outcome of `submit_payment`, shaped so UI callers can render a failure
/// toast without unwrapping errors.
#[derive(Debug)]
pub struct PaymentResult {
    pub success: bool,
    pub receipt_id: Option<ReceiptId>,
    pub receipt: Option<PaymentReceipt>,
    pub error: Option<String>,
}

impl PaymentResult {
    fn ok(receipt: PaymentReceipt) -> Self {
        Self {
            success: true,
            receipt_id: Some(receipt.id.clone()),
            receipt: Some(receipt),
            error: None,
        }
    }

    fn err(error: impl ToString) -> Self {
        Self {
            success: false,
            receipt_id: None,
            receipt: None,
            error: Some(error.to_string()),
        }
    }
}

/// Point-in-time diagnostic snapshot of the queue. Best-effort: no
/// consistency guarantee against a concurrently running drain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueStatus {
    pub queue_length: usize,
    pub current_processing: Option<ReceiptId>,
    pub processed_count: u64,
    pub failed_count: u64,
}

/// Owns the lifecycle of payment-approval requests.
///
/// Submissions are persisted as `pending` receipts, queued, and drained FIFO
/// with bounded retry against the payment gateway; approve/reject transition
/// the receipt and emit events through the injected sink.
///
/// An explicitly constructed service object: build one per composition root
/// and clone it wherever a handle is needed (all state is shared behind
/// `Arc`). Locks guard only synchronous mutation and are never held across an
/// await.
#[derive(Clone)]
pub struct PaymentProcessor {
    store: ReceiptStoreRef,
    gateway: PaymentGatewayRef,
    events: EventSinkRef,
    config: ProcessorConfig,
    queue: Arc<Mutex<VecDeque<PaymentRequest>>>,
    retries: Arc<Mutex<HashMap<ReceiptId, u32>>>,
    /// Non-reentrant guard: collapses concurrent drain triggers into one loop.
    is_processing: Arc<AtomicBool>,
    current: Arc<Mutex<Option<ReceiptId>>>,
    processed: Arc<AtomicU64>,
    failed: Arc<AtomicU64>,
}

impl PaymentProcessor {
    pub fn new(store: ReceiptStoreRef, gateway: PaymentGatewayRef, events: EventSinkRef) -> Self {
        Self::with_config(store, gateway, events, ProcessorConfig::default())
    }

    pub fn with_config(
        store: ReceiptStoreRef,
        gateway: PaymentGatewayRef,
        events: EventSinkRef,
        config: ProcessorConfig,
    ) -> Self {
        Self {
            store,
            gateway,
            events,
            config,
            queue: Arc::new(Mutex::new(VecDeque::new())),
            retries: Arc::new(Mutex::new(HashMap::new())),
            is_processing: Arc::new(AtomicBool::new(false)),
            current: Arc::new(Mutex::new(None)),
            processed: Arc::new(AtomicU64::new(0)),
            failed: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Accepts a payment submission.
    ///
    /// Persists a `pending` receipt, enqueues the request, emits
    /// `payment_submitted`, and triggers an asynchronous drain; returns
    /// immediately without waiting for the queue. Validation beyond presence
    /// is the caller's responsibility. Internal errors are caught here and
    /// reported as `success: false`.
    pub async fn submit_payment(&self, submission: PaymentSubmission) -> PaymentResult {
        match self.try_submit(submission).await {
            Ok(receipt) => PaymentResult::ok(receipt),
            Err(e) => {
                error!(error = %e, "payment submission failed");
                PaymentResult::err(e)
            }
        }
    }

    async fn try_submit(&self, submission: PaymentSubmission) -> Result<PaymentReceipt> {
        let id = ReceiptId::generate();
        let receipt = PaymentReceipt::from_submission(id.clone(), &submission);
        self.store.save(receipt.clone()).await?;

        let request = PaymentRequest {
            id,
            submission: submission.clone(),
            timestamp: Utc::now(),
        };
        lock(&self.queue).push_back(request);

        self.events.notify_payment_submitted(&submission, &receipt);
        self.spawn_drain();
        Ok(receipt)
    }

    /// Transitions the receipt to `approved`, records the notes, and emits
    /// `payment_approved`.
    ///
    /// Not idempotent: approving an already-approved receipt re-records the
    /// decision and re-emits the event. Callers disable the action once a
    /// receipt leaves `pending`. Returns `false` on a missing receipt or an
    /// illegal transition (e.g. a rejected receipt cannot be approved).
    pub async fn approve_payment(&self, id: &ReceiptId, admin_notes: Option<String>) -> bool {
        tokio::time::sleep(self.config.decision_delay).await;
        match self
            .store
            .update_status(id, ReceiptStatus::Approved, admin_notes.clone())
            .await
        {
            Ok(_) => {
                self.events.notify_payment_approved(id, admin_notes);
                true
            }
            Err(e) => {
                warn!(receipt_id = %id, error = %e, "approve failed");
                false
            }
        }
    }

    /// Transitions the receipt to `rejected` and emits `payment_rejected`.
    ///
    /// A non-empty reason is a caller contract; the processor does not
    /// enforce it.
    pub async fn reject_payment(&self, id: &ReceiptId, admin_notes: String) -> bool {
        tokio::time::sleep(self.config.decision_delay).await;
        match self
            .store
            .update_status(id, ReceiptStatus::Rejected, Some(admin_notes.clone()))
            .await
        {
            Ok(_) => {
                self.events.notify_payment_rejected(id, admin_notes);
                true
            }
            Err(e) => {
                warn!(receipt_id = %id, error = %e, "reject failed");
                false
            }
        }
    }

    pub fn queue_status(&self) -> QueueStatus {
        QueueStatus {
            queue_length: lock(&self.queue).len(),
            current_processing: lock(&self.current).clone(),
            processed_count: self.processed.load(Ordering::SeqCst),
            failed_count: self.failed.load(Ordering::SeqCst),
        }
    }

    /// Whether a drain loop is currently active.
    pub fn is_draining(&self) -> bool {
        self.is_processing.load(Ordering::SeqCst)
    }

    /// Starts a drain task unless one is already running.
    fn spawn_drain(&self) {
        if self
            .is_processing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            let processor = self.clone();
            tokio::spawn(async move {
                processor.drain().await;
                processor.is_processing.store(false, Ordering::SeqCst);
                // A submission may have raced in after the last pop.
                if !lock(&processor.queue).is_empty() {
                    processor.spawn_drain();
                }
            });
        }
    }

    /// Drains the queue strictly FIFO, retrying transient gateway failures.
    ///
    /// Retried requests go back to the FRONT of the queue, so retries are
    /// prioritized over newer arrivals. A request that fails `MAX_ATTEMPTS`
    /// times is dropped and its receipt marked `failed` for manual admin
    /// follow-up.
    async fn drain(&self) {
        debug!("queue drain started");
        loop {
            let request = lock(&self.queue).pop_front();
            let Some(request) = request else { break };
            *lock(&self.current) = Some(request.id.clone());

            match self.gateway.process(&request).await {
                Ok(()) => self.handle_processed(&request).await,
                Err(e) => self.handle_failure(request, e.to_string()).await,
            }

            *lock(&self.current) = None;
            tokio::time::sleep(self.config.drain_delay).await;
        }
        debug!("queue drain finished");
    }

    async fn handle_processed(&self, request: &PaymentRequest) {
        lock(&self.retries).remove(&request.id);
        // The receipt moves to `processing` while awaiting the admin
        // decision. If the admin already decided, keep that decision.
        if let Err(e) = self
            .store
            .update_status(&request.id, ReceiptStatus::Processing, None)
            .await
        {
            debug!(receipt_id = %request.id, error = %e, "receipt already decided, skipping processing mark");
        }
        self.processed.fetch_add(1, Ordering::SeqCst);
        self.events.notify_system(
            Severity::Info,
            format!("payment request {} processed", request.id),
        );
    }

    async fn handle_failure(&self, request: PaymentRequest, reason: String) {
        let attempts = {
            let mut retries = lock(&self.retries);
            let attempts = retries.get(&request.id).copied().unwrap_or(0) + 1;
            if attempts < MAX_ATTEMPTS {
                retries.insert(request.id.clone(), attempts);
            } else {
                retries.remove(&request.id);
            }
            attempts
        };

        if attempts < MAX_ATTEMPTS {
            warn!(receipt_id = %request.id, attempts, reason = %reason, "payment processing failed, retrying");
            self.events.notify_system(
                Severity::Warning,
                format!(
                    "payment request {} failed (attempt {attempts} of {MAX_ATTEMPTS}), retrying",
                    request.id
                ),
            );
            lock(&self.queue).push_front(request);
        } else {
            error!(receipt_id = %request.id, reason = %reason, "payment processing failed permanently");
            self.failed.fetch_add(1, Ordering::SeqCst);
            if let Err(e) = self
                .store
                .update_status(&request.id, ReceiptStatus::Failed, None)
                .await
            {
                warn!(receipt_id = %request.id, error = %e, "could not mark receipt failed");
            }
            self.events.notify_system(
                Severity::Error,
                format!(
                    "payment request {} dropped after {MAX_ATTEMPTS} attempts",
                    request.id
                ),
            );
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
