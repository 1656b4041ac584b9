//! Sync and categorization core.
//!
//! [`Engine`] reconciles provider transactions into local storage one page at
//! a time and records which wallet each transaction belongs to.

pub use categorizations::CategoryType;
pub use error::EngineError;
pub use money::MoneyCents;
pub use ops::{
    AccountSummary, Engine, EngineBuilder, LinkedItemSummary, SyncTotals, TransactionPage,
    TransactionPageRequest,
};
pub use reconcile::AccountMap;
pub use transactions::{Transaction, TransactionMetadata};

mod accounts;
mod categorizations;
mod error;
mod in_flight;
mod linked_items;
mod money;
mod ops;
mod reconcile;
mod transactions;
mod wallet_members;
mod wallets;

type ResultEngine<T> = Result<T, EngineError>;
