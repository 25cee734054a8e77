use std::result::Result as StdResult;

use thiserror::Error;

use crate::domain::{JustificationReason, RejectionReason};

/// Unified error type for the allocation, admission, and storage layers.
#[derive(Error, Debug)]
pub enum BudgetError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Invalid allocation: {0}")]
    InvalidAllocation(String),
    #[error("Transaction rejected: {0}")]
    Rejected(RejectionReason),
    #[error("Buffer justification required: {0}")]
    JustificationRequired(JustificationReason),
    #[error("Buffer exhausted: requested {requested:.2}, available {available:.2}")]
    BufferExhausted { requested: f64, available: f64 },
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = StdResult<T, BudgetError>;

impl From<std::io::Error> for BudgetError {
    fn from(err: std::io::Error) -> Self {
        BudgetError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for BudgetError {
    fn from(err: serde_json::Error) -> Self {
        BudgetError::Storage(err.to_string())
    }
}

/// User-facing error wrapper for the command shell.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] BudgetError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error(transparent)]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
