//! Error taxonomy shared by all domain services.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BillError {
    /// Missing or malformed request input
    #[error("{0}")]
    Validation(String),

    /// Unknown bill id or name
    #[error("{0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl BillError {
    pub fn validation(message: impl Into<String>) -> Self {
        BillError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        BillError::NotFound(message.into())
    }
}

pub type BillResult<T> = Result<T, BillError>;
