//! Error types for mte-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Ledger full: limit of {limit} records reached")]
    LedgerFull { limit: usize },
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
