use chrono::Utc;
use ledger_client::LinkToken;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use secrecy::ExposeSecret;
use tracing::{info, warn};

use crate::{EngineError, ResultEngine, accounts, error::is_unique_violation, linked_items};

use super::{Engine, normalize_optional_text, with_tx};

const UNKNOWN_INSTITUTION: &str = "Unknown";

/// A provider account as shown to its owner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountSummary {
    pub id: i32,
    pub account_id: String,
    pub name: String,
    pub official_name: Option<String>,
    pub account_type: String,
    pub subtype: Option<String>,
    pub institution: String,
}

impl AccountSummary {
    fn new(model: accounts::Model, institution: &str) -> Self {
        Self {
            id: model.id,
            account_id: model.account_id,
            name: model.name,
            official_name: model.official_name,
            account_type: model.account_type,
            subtype: model.subtype,
            institution: institution.to_string(),
        }
    }
}

/// Outcome of a successful public-token exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkedItemSummary {
    pub item_id: String,
    pub institution: String,
    pub accounts: Vec<AccountSummary>,
}

impl Engine {
    /// Starts the client-side link flow for `user_id`.
    pub async fn create_link_token(
        &self,
        user_id: i32,
        redirect_uri: Option<&str>,
    ) -> ResultEngine<LinkToken> {
        let redirect_uri = normalize_optional_text(redirect_uri);
        let token = self
            .provider
            .create_link_token(&user_id.to_string(), redirect_uri.as_deref())
            .await?;
        Ok(token)
    }

    /// Exchanges a public token and stores the resulting item with all of its
    /// accounts.
    ///
    /// The item starts without a cursor, so its first sync covers the whole
    /// history. An institution lookup failure is not fatal: the item is
    /// stored without a name.
    pub async fn link_item(
        &self,
        user_id: i32,
        public_token: &str,
        institution_id: Option<&str>,
    ) -> ResultEngine<LinkedItemSummary> {
        let public_token = public_token.trim();
        if public_token.is_empty() {
            return Err(EngineError::InvalidInput(
                "public_token must not be empty".to_string(),
            ));
        }

        let exchange = self.provider.exchange_public_token(public_token).await?;

        let institution_name = match normalize_optional_text(institution_id) {
            Some(id) => match self.provider.institution_name(&id).await {
                Ok(name) => Some(name),
                Err(err) => {
                    warn!(institution_id = %id, "institution lookup failed: {err}");
                    None
                }
            },
            None => None,
        };

        let provider_accounts = self.provider.accounts(&exchange.access_token).await?;

        with_tx!(self, |db_tx| {
            let item = linked_items::ActiveModel {
                id: ActiveValue::NotSet,
                user_id: ActiveValue::Set(user_id),
                item_id: ActiveValue::Set(exchange.item_id.clone()),
                access_token: ActiveValue::Set(exchange.access_token.expose_secret().clone()),
                institution_name: ActiveValue::Set(institution_name.clone()),
                transactions_cursor: ActiveValue::Set(None),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    EngineError::ExistingKey(exchange.item_id.clone())
                } else {
                    EngineError::Database(err)
                }
            })?;

            let institution = item
                .institution_name
                .as_deref()
                .unwrap_or(UNKNOWN_INSTITUTION);
            let mut accounts = Vec::with_capacity(provider_accounts.len());
            for account in &provider_accounts {
                let model = accounts::ActiveModel {
                    id: ActiveValue::NotSet,
                    linked_item_id: ActiveValue::Set(item.id),
                    account_id: ActiveValue::Set(account.account_id.clone()),
                    name: ActiveValue::Set(account.name.clone()),
                    official_name: ActiveValue::Set(account.official_name.clone()),
                    account_type: ActiveValue::Set(account.account_type.clone()),
                    subtype: ActiveValue::Set(account.subtype.clone()),
                }
                .insert(&db_tx)
                .await?;
                accounts.push(AccountSummary::new(model, institution));
            }

            info!(
                user_id,
                item_id = %item.item_id,
                accounts = accounts.len(),
                "linked item"
            );
            Ok::<_, EngineError>(LinkedItemSummary {
                item_id: item.item_id.clone(),
                institution: institution.to_string(),
                accounts,
            })
        })
    }

    /// Every account across the linked items of `user_id`.
    pub async fn accounts_for_user(&self, user_id: i32) -> ResultEngine<Vec<AccountSummary>> {
        let rows = accounts::Entity::find()
            .find_also_related(linked_items::Entity)
            .filter(linked_items::Column::UserId.eq(user_id))
            .order_by_asc(accounts::Column::Id)
            .all(&self.database)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(account, item)| {
                let institution = item
                    .and_then(|item| item.institution_name)
                    .unwrap_or_else(|| UNKNOWN_INSTITUTION.to_string());
                AccountSummary::new(account, &institution)
            })
            .collect())
    }
}
