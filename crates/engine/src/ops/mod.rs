use std::{fmt, sync::Arc};

use ledger_client::LedgerProvider;
use sea_orm::DatabaseConnection;

use crate::{EngineError, ResultEngine, in_flight::InFlightItems};

mod categorize;
mod link;
mod queries;
mod sync;

pub use link::{AccountSummary, LinkedItemSummary};
pub use queries::{TransactionPage, TransactionPageRequest};
pub use sync::SyncTotals;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

pub struct Engine {
    database: DatabaseConnection,
    provider: Arc<dyn LedgerProvider>,
    in_flight: InFlightItems,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("database", &self.database)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    provider: Option<Arc<dyn LedgerProvider>>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Pass the aggregation provider the engine syncs from
    pub fn provider(mut self, provider: Arc<dyn LedgerProvider>) -> EngineBuilder {
        self.provider = Some(provider);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let provider = self
            .provider
            .ok_or_else(|| EngineError::InvalidInput("provider is required".to_string()))?;
        Ok(Engine {
            database: self.database,
            provider,
            in_flight: InFlightItems::default(),
        })
    }
}
