use crate::domain::transaction::{TransactionId, TransactionStatus};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Decode error: {0}")]
    DecodeError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid state: transaction {id} is {actual}, expected {expected}")]
    InvalidState {
        id: TransactionId,
        expected: TransactionStatus,
        actual: TransactionStatus,
    },
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Transport error: {0}")]
    TransportError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    StorageError(#[from] rocksdb::Error),
}

pub type Result<T> = std::result::Result<T, RelayError>;
