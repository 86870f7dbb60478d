use thiserror::Error;

/// Error type shared by the store, its persistence adapters and the exporters.
#[derive(Debug, Error)]
pub enum FinanceError {
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Export error: {0}")]
    Export(String),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),
}

pub type Result<T> = std::result::Result<T, FinanceError>;

impl From<std::io::Error> for FinanceError {
    fn from(err: std::io::Error) -> Self {
        FinanceError::Storage(err.to_string())
    }
}

impl From<csv::Error> for FinanceError {
    fn from(err: csv::Error) -> Self {
        FinanceError::Export(err.to_string())
    }
}

/// Reasons a serialized collection is rejected by an import.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("import payload is not valid JSON: {0}")]
    Syntax(String),
    #[error("import payload must be a JSON array")]
    NotAnArray,
    #[error("element {index} is invalid: {reason}")]
    InvalidElement { index: usize, reason: String },
}
