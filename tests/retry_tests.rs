mod common;

use common::{FlakyGateway, build_pipeline, collect_events, submission, wait_for_idle};
use keyra::domain::event::{RealtimeEvent, Severity};
use keyra::domain::ports::ReceiptStore;
use keyra::domain::receipt::ReceiptStatus;

#[tokio::test]
async fn test_transient_failure_recovers_within_ceiling() {
    let (processor, store, bus) = build_pipeline(FlakyGateway::failing(2));
    let events = collect_events(&bus);

    let result = processor.submit_payment(submission("u1", 50)).await;
    wait_for_idle(&processor).await;

    let status = processor.queue_status();
    assert_eq!(status.processed_count, 1);
    assert_eq!(status.failed_count, 0);

    let receipt = store
        .find_by_id(&result.receipt_id.unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(receipt.status, ReceiptStatus::Processing);

    // One warning per retried attempt, no error-severity notification.
    let events = events.lock().unwrap();
    let warnings = events
        .iter()
        .filter(|p| {
            matches!(
                &p.event,
                RealtimeEvent::SystemNotification {
                    severity: Severity::Warning,
                    ..
                }
            )
        })
        .count();
    assert_eq!(warnings, 2);
    assert!(!events.iter().any(|p| {
        matches!(
            &p.event,
            RealtimeEvent::SystemNotification {
                severity: Severity::Error,
                ..
            }
        )
    }));
}

#[tokio::test]
async fn test_retry_ceiling_drops_request() {
    let (processor, store, bus) = build_pipeline(FlakyGateway::failing(3));
    let events = collect_events(&bus);

    let result = processor.submit_payment(submission("u1", 50)).await;
    wait_for_idle(&processor).await;

    let status = processor.queue_status();
    assert_eq!(status.queue_length, 0);
    assert_eq!(status.processed_count, 0);
    assert_eq!(status.failed_count, 1);

    // The receipt is marked failed for manual admin follow-up instead of
    // lingering pending forever.
    let receipt = store
        .find_by_id(&result.receipt_id.unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(receipt.status, ReceiptStatus::Failed);
    assert_eq!(store.list_pending().await.unwrap().len(), 1);

    // Exactly one error-severity notification for the drop, not one per attempt.
    let errors = events
        .lock()
        .unwrap()
        .iter()
        .filter(|p| {
            matches!(
                &p.event,
                RealtimeEvent::SystemNotification {
                    severity: Severity::Error,
                    ..
                }
            )
        })
        .count();
    assert_eq!(errors, 1);
}

#[tokio::test]
async fn test_retries_do_not_stall_later_submissions() {
    // First request exhausts its retries; a second submitted afterwards is
    // still processed.
    let (processor, _store, _bus) = build_pipeline(FlakyGateway::failing(3));

    processor.submit_payment(submission("u1", 50)).await;
    processor.submit_payment(submission("u2", 75)).await;
    wait_for_idle(&processor).await;

    let status = processor.queue_status();
    assert_eq!(status.processed_count, 1);
    assert_eq!(status.failed_count, 1);
}

#[tokio::test]
async fn test_failed_receipt_can_be_decided_manually() {
    let (processor, store, _bus) = build_pipeline(FlakyGateway::failing(3));

    let result = processor.submit_payment(submission("u1", 50)).await;
    let id = result.receipt_id.unwrap();
    wait_for_idle(&processor).await;

    assert_eq!(
        store.find_by_id(&id).await.unwrap().unwrap().status,
        ReceiptStatus::Failed
    );

    // Admin follow-up on a failed receipt still works.
    assert!(
        processor
            .approve_payment(&id, Some("verified manually".to_string()))
            .await
    );
    assert_eq!(
        store.find_by_id(&id).await.unwrap().unwrap().status,
        ReceiptStatus::Approved
    );
}
