#![cfg(feature = "storage-rocksdb")]

mod common;

use common::{FlakyGateway, build_pipeline, submission};
use keyra::application::processor::{PaymentProcessor, ProcessorConfig};
use keyra::domain::ports::{EventSinkRef, ReceiptStore};
use keyra::domain::receipt::ReceiptStatus;
use keyra::infrastructure::event_bus::EventBus;
use keyra::infrastructure::rocksdb::RocksDbReceiptStore;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_receipts_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let id = {
        let store = Arc::new(RocksDbReceiptStore::open(dir.path()).unwrap());
        let events: EventSinkRef = Arc::new(EventBus::new());
        let config = ProcessorConfig {
            drain_delay: Duration::from_millis(1),
            decision_delay: Duration::ZERO,
        };
        let processor = PaymentProcessor::with_config(
            store.clone(),
            FlakyGateway::reliable(),
            events,
            config,
        );

        let result = processor.submit_payment(submission("u1", 50)).await;
        assert!(result.success);
        let id = result.receipt_id.unwrap();
        common::wait_for_idle(&processor).await;
        assert!(processor.approve_payment(&id, Some("looks good".to_string())).await);
        // Let the drain task drop its handle before reopening the database.
        tokio::time::sleep(Duration::from_millis(100)).await;
        id
    };

    // The queue is not durable, but decided receipts are.
    let reopened = RocksDbReceiptStore::open(dir.path()).unwrap();
    let receipt = reopened.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(receipt.status, ReceiptStatus::Approved);
    assert_eq!(receipt.admin_notes.as_deref(), Some("looks good"));
    assert!(reopened.list_pending().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_in_memory_pipeline_matches_persistent_semantics() {
    // Same decision flow against the in-memory adapter, to pin the port
    // contract both adapters share.
    let (processor, store, _bus) = build_pipeline(FlakyGateway::reliable());
    let result = processor.submit_payment(submission("u1", 50)).await;
    let id = result.receipt_id.unwrap();
    assert!(processor.approve_payment(&id, Some("looks good".to_string())).await);
    assert!(store.list_pending().await.unwrap().is_empty());
}
