use crate::domain::receipt::ReceiptStatus;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, KeyraError>;

#[derive(Error, Debug)]
pub enum KeyraError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("receipt not found: {0}")]
    ReceiptNotFound(String),
    #[error("invalid receipt status transition: {from} -> {to}")]
    InvalidTransition {
        from: ReceiptStatus,
        to: ReceiptStatus,
    },
    #[error("payment gateway error: {0}")]
    Gateway(String),
    #[error("storage error: {0}")]
    Storage(Box<dyn std::error::Error + Send + Sync>),
}
