//! The module contains the error the engine can throw.
//!
//! Errors fall in three groups:
//!
//! - transport: [`Provider`] wraps whatever the aggregation provider failed
//!   with; the item sync stops, already persisted pages stay.
//! - persistence: [`Database`] aborts the current page or operation.
//! - domain: everything else, surfaced to the caller as a client error.
//!
//!  [`Provider`]: EngineError::Provider
//!  [`Database`]: EngineError::Database
use ledger_client::ProviderError;
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
    #[error("Invalid category type: {0}")]
    InvalidCategoryType(String),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),
    #[error("Wallet not found: {0}")]
    WalletNotFound(String),
    #[error("Unauthorized access: {0}")]
    UnauthorizedAccess(String),
    #[error("Transaction already categorized: {0}")]
    AlreadyCategorized(String),
    #[error("Sync already in progress for item {0}")]
    SyncInProgress(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Provider(a), Self::Provider(b)) => a.to_string() == b.to_string(),
            (Self::InvalidCategoryType(a), Self::InvalidCategoryType(b)) => a == b,
            (Self::TransactionNotFound(a), Self::TransactionNotFound(b)) => a == b,
            (Self::WalletNotFound(a), Self::WalletNotFound(b)) => a == b,
            (Self::UnauthorizedAccess(a), Self::UnauthorizedAccess(b)) => a == b,
            (Self::AlreadyCategorized(a), Self::AlreadyCategorized(b)) => a == b,
            (Self::SyncInProgress(a), Self::SyncInProgress(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

/// Returns `true` when the storage layer rejected a write because of a
/// unique index.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(
        err.sql_err(),
        Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
    )
}
