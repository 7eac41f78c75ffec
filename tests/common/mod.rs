#![allow(dead_code)]

use async_trait::async_trait;
use keyra::application::processor::{PaymentProcessor, ProcessorConfig};
use keyra::domain::event::RealtimePayload;
use keyra::domain::ports::{PaymentGateway, PaymentGatewayRef};
use keyra::domain::receipt::{PaymentRequest, PaymentSubmission, PlanType};
use keyra::error::{KeyraError, Result};
use keyra::infrastructure::event_bus::EventBus;
use keyra::infrastructure::in_memory::InMemoryReceiptStore;
use std::fs::File;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Gateway that fails a fixed number of times before succeeding.
pub struct FlakyGateway {
    failures: Mutex<u32>,
}

impl FlakyGateway {
    pub fn failing(times: u32) -> Arc<Self> {
        Arc::new(Self {
            failures: Mutex::new(times),
        })
    }

    pub fn reliable() -> Arc<Self> {
        Self::failing(0)
    }
}

#[async_trait]
impl PaymentGateway for FlakyGateway {
    async fn process(&self, _request: &PaymentRequest) -> Result<()> {
        let mut failures = self.failures.lock().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return Err(KeyraError::Gateway("simulated outage".to_string()));
        }
        Ok(())
    }
}

pub fn submission(user_id: &str, amount: u64) -> PaymentSubmission {
    PaymentSubmission {
        user_id: user_id.to_string(),
        plan_type: PlanType::Single,
        amount,
        receipt_url: "r.png".to_string(),
        user_email: None,
        user_name: None,
    }
}

/// Wires a full pipeline: in-memory store, the given gateway, a fresh bus.
pub fn build_pipeline(
    gateway: PaymentGatewayRef,
) -> (PaymentProcessor, Arc<InMemoryReceiptStore>, EventBus) {
    let store = Arc::new(InMemoryReceiptStore::new());
    let bus = EventBus::new();
    let config = ProcessorConfig {
        drain_delay: Duration::from_millis(1),
        decision_delay: Duration::ZERO,
    };
    let processor =
        PaymentProcessor::with_config(store.clone(), gateway, Arc::new(bus.clone()), config);
    (processor, store, bus)
}

/// Subscribes a collector to the bus; the subscription stays alive for the
/// lifetime of the bus.
pub fn collect_events(bus: &EventBus) -> Arc<Mutex<Vec<RealtimePayload>>> {
    let seen: Arc<Mutex<Vec<RealtimePayload>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let subscription = bus.subscribe(move |payload| sink.lock().unwrap().push(payload.clone()));
    std::mem::forget(subscription);
    seen
}

/// Polls until the queue is empty and no drain loop is active.
pub async fn wait_for_idle(processor: &PaymentProcessor) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let status = processor.queue_status();
            if status.queue_length == 0
                && status.current_processing.is_none()
                && !processor.is_draining()
            {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("queue did not drain in time");
}

/// Writes a submissions CSV with `rows` single-plan rows.
pub fn generate_submissions_csv(path: &Path, rows: usize) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record([
        "user_id",
        "plan_type",
        "amount",
        "receipt_url",
        "user_email",
        "user_name",
    ])?;
    for i in 1..=rows {
        wtr.write_record([&format!("u{i}"), "single", "50", "r.png", "", ""])?;
    }
    wtr.flush()?;
    Ok(())
}
