//! Thin typed client over the account-aggregation provider.
//!
//! The rest of the workspace only talks to the provider through
//! [`LedgerProvider`], so the sync engine can be driven by a scripted fake
//! in tests and by [`PlaidClient`] in production.

use async_trait::async_trait;
use secrecy::SecretString;

pub use client::{PlaidClient, PlaidConfig};
pub use error::ProviderError;
pub use types::{
    Counterparty, Environment, LinkToken, Location, PaymentMeta, PersonalFinanceCategory,
    ProviderAccount, ProviderTransaction, RemovedTransaction, SyncPage, TokenExchange,
};

mod client;
mod error;
mod types;

/// Operations the core needs from the aggregation provider.
#[async_trait]
pub trait LedgerProvider: Send + Sync {
    /// Create a short-lived token used by the client-side link flow.
    async fn create_link_token(
        &self,
        client_user_id: &str,
        redirect_uri: Option<&str>,
    ) -> Result<LinkToken, ProviderError>;

    /// Trade the public token from the link flow for a long-lived access
    /// credential.
    async fn exchange_public_token(
        &self,
        public_token: &str,
    ) -> Result<TokenExchange, ProviderError>;

    async fn accounts(
        &self,
        access_token: &SecretString,
    ) -> Result<Vec<ProviderAccount>, ProviderError>;

    async fn institution_name(&self, institution_id: &str) -> Result<String, ProviderError>;

    /// Fetch one page of deltas after `cursor`; `None` starts from the
    /// beginning of the item's history.
    async fn sync_transactions(
        &self,
        access_token: &SecretString,
        cursor: Option<&str>,
    ) -> Result<SyncPage, ProviderError>;
}
