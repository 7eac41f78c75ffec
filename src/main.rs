use clap::Parser;
use keyra::application::processor::{PaymentProcessor, ProcessorConfig};
use keyra::domain::ports::{EventSinkRef, PaymentGatewayRef, ReceiptStoreRef};
use keyra::infrastructure::event_bus::EventBus;
use keyra::infrastructure::gateway::SimulatedGateway;
use keyra::infrastructure::in_memory::InMemoryReceiptStore;
use keyra::interfaces::csv::receipt_writer::ReceiptWriter;
use keyra::interfaces::csv::submission_reader::SubmissionReader;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input payment submissions CSV file
    input: PathBuf,

    /// Path to persistent receipt database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Approve every receipt still awaiting a decision once the queue drains
    #[arg(long)]
    auto_approve: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let store = open_store(cli.db_path)?;

    let bus = EventBus::new();
    let _subscription = bus.subscribe(|payload| {
        tracing::debug!(event = payload.event.name(), "bus event");
    });

    let gateway: PaymentGatewayRef = Arc::new(SimulatedGateway::new(Duration::from_millis(10)));
    let events: EventSinkRef = Arc::new(bus.clone());
    let config = ProcessorConfig {
        drain_delay: Duration::from_millis(10),
        decision_delay: Duration::from_millis(5),
    };
    let processor = PaymentProcessor::with_config(store.clone(), gateway, events, config);

    // Submit every row; malformed rows are reported and skipped.
    let file = File::open(cli.input).into_diagnostic()?;
    let reader = SubmissionReader::new(file);
    for submission_result in reader.submissions() {
        match submission_result {
            Ok(submission) => {
                let result = processor.submit_payment(submission).await;
                if !result.success {
                    eprintln!(
                        "Error submitting payment: {}",
                        result.error.unwrap_or_default()
                    );
                }
            }
            Err(e) => {
                eprintln!("Error reading submission: {}", e);
            }
        }
    }

    wait_for_drain(&processor).await;

    if cli.auto_approve {
        for receipt in store.list_pending().await.into_diagnostic()? {
            let approved = processor
                .approve_payment(&receipt.id, Some("auto-approved".to_string()))
                .await;
            if !approved {
                eprintln!("Error approving receipt {}", receipt.id);
            }
        }
    }

    // Output the final receipt report.
    let receipts = store.list_all().await.into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = ReceiptWriter::new(stdout.lock());
    writer.write_receipts(receipts).into_diagnostic()?;

    Ok(())
}

async fn wait_for_drain(processor: &PaymentProcessor) {
    loop {
        let status = processor.queue_status();
        if status.queue_length == 0
            && status.current_processing.is_none()
            && !processor.is_draining()
        {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[cfg(feature = "storage-rocksdb")]
fn open_store(db_path: Option<PathBuf>) -> Result<ReceiptStoreRef> {
    use keyra::infrastructure::rocksdb::RocksDbReceiptStore;
    match db_path {
        Some(path) => {
            let store = RocksDbReceiptStore::open(path).into_diagnostic()?;
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(InMemoryReceiptStore::new())),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_store(db_path: Option<PathBuf>) -> Result<ReceiptStoreRef> {
    if db_path.is_some() {
        eprintln!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(Arc::new(InMemoryReceiptStore::new()))
}
