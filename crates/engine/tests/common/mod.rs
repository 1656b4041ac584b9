#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use engine::Engine;
use ledger_client::{
    LedgerProvider, LinkToken, ProviderAccount, ProviderError, ProviderTransaction,
    RemovedTransaction, SyncPage, TokenExchange,
};
use migration::MigratorTrait;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use secrecy::{ExposeSecret, SecretString};

pub const ITEM_ID: &str = "item-1";
pub const ACCESS_TOKEN: &str = "access-sandbox-1";

/// Provider fake that replays a script of sync pages and records the cursor
/// of every sync call.
#[derive(Default)]
pub struct ScriptedProvider {
    pages: Mutex<VecDeque<Result<SyncPage, ProviderError>>>,
    cursors: Mutex<Vec<Option<String>>>,
    item_id: Mutex<Option<String>>,
    accounts: Mutex<Vec<ProviderAccount>>,
    institution: Mutex<Option<String>>,
    gate: tokio::sync::Mutex<()>,
}

impl ScriptedProvider {
    pub fn push_page(&self, page: SyncPage) {
        self.pages.lock().unwrap().push_back(Ok(page));
    }

    pub fn push_error(&self, error: ProviderError) {
        self.pages.lock().unwrap().push_back(Err(error));
    }

    pub fn set_accounts(&self, ids: &[&str]) {
        *self.accounts.lock().unwrap() = ids.iter().map(|id| account(id)).collect();
    }

    pub fn set_item_id(&self, item_id: &str) {
        *self.item_id.lock().unwrap() = Some(item_id.to_string());
    }

    pub fn set_institution(&self, name: &str) {
        *self.institution.lock().unwrap() = Some(name.to_string());
    }

    /// Cursors passed to `sync_transactions`, in call order.
    pub fn cursors(&self) -> Vec<Option<String>> {
        self.cursors.lock().unwrap().clone()
    }

    /// Holding the returned guard parks every sync call after it recorded its
    /// cursor.
    pub async fn hold(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.gate.lock().await
    }
}

#[async_trait]
impl LedgerProvider for ScriptedProvider {
    async fn create_link_token(
        &self,
        client_user_id: &str,
        _redirect_uri: Option<&str>,
    ) -> Result<LinkToken, ProviderError> {
        Ok(LinkToken {
            link_token: format!("link-sandbox-{client_user_id}"),
            expiration: "2026-01-01T00:00:00Z".to_string(),
        })
    }

    async fn exchange_public_token(
        &self,
        public_token: &str,
    ) -> Result<TokenExchange, ProviderError> {
        if public_token == "bad-token" {
            return Err(api_error("INVALID_PUBLIC_TOKEN"));
        }
        let item_id = self
            .item_id
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| ITEM_ID.to_string());
        Ok(TokenExchange {
            access_token: SecretString::new(ACCESS_TOKEN.to_string()),
            item_id,
        })
    }

    async fn accounts(
        &self,
        access_token: &SecretString,
    ) -> Result<Vec<ProviderAccount>, ProviderError> {
        assert_eq!(access_token.expose_secret(), ACCESS_TOKEN);
        Ok(self.accounts.lock().unwrap().clone())
    }

    async fn institution_name(&self, _institution_id: &str) -> Result<String, ProviderError> {
        self.institution
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| api_error("INSTITUTION_NOT_FOUND"))
    }

    async fn sync_transactions(
        &self,
        access_token: &SecretString,
        cursor: Option<&str>,
    ) -> Result<SyncPage, ProviderError> {
        assert_eq!(access_token.expose_secret(), ACCESS_TOKEN);
        self.cursors
            .lock()
            .unwrap()
            .push(cursor.map(ToString::to_string));
        drop(self.gate.lock().await);

        // An exhausted script means the feed has nothing new.
        let next = self.pages.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(page(&[], &[], &[], cursor.unwrap_or_default(), false)))
    }
}

pub fn api_error(code: &str) -> ProviderError {
    ProviderError::Api {
        status: 400,
        error_code: code.to_string(),
        message: "scripted failure".to_string(),
    }
}

pub fn account(id: &str) -> ProviderAccount {
    ProviderAccount {
        account_id: id.to_string(),
        name: format!("Account {id}"),
        official_name: None,
        account_type: "depository".to_string(),
        subtype: Some("checking".to_string()),
    }
}

pub fn provider_tx(id: &str, account_id: &str, amount: f64, day: u32) -> ProviderTransaction {
    ProviderTransaction {
        transaction_id: id.to_string(),
        account_id: account_id.to_string(),
        amount,
        date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
        authorized_date: None,
        name: format!("Purchase {id}"),
        merchant_name: None,
        pending: true,
        payment_channel: "online".to_string(),
        transaction_code: None,
        iso_currency_code: Some("USD".to_string()),
        unofficial_currency_code: None,
        location: None,
        payment_meta: None,
        personal_finance_category: None,
        counterparties: Vec::new(),
    }
}

pub fn settled(mut tx: ProviderTransaction) -> ProviderTransaction {
    tx.pending = false;
    tx
}

pub fn page(
    added: &[ProviderTransaction],
    modified: &[ProviderTransaction],
    removed: &[&str],
    next_cursor: &str,
    has_more: bool,
) -> SyncPage {
    SyncPage {
        added: added.to_vec(),
        modified: modified.to_vec(),
        removed: removed
            .iter()
            .map(|id| RemovedTransaction {
                transaction_id: id.to_string(),
            })
            .collect(),
        next_cursor: next_cursor.to_string(),
        has_more,
    }
}

pub struct Harness {
    pub engine: Arc<Engine>,
    pub provider: Arc<ScriptedProvider>,
    pub db: DatabaseConnection,
}

/// Migrated in-memory database with users 1 (alice) and 2 (bob) and wallet 1
/// ("Household") that both belong to.
pub async fn harness() -> Harness {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();

    for email in ["alice@example.com", "bob@example.com"] {
        execute(
            &db,
            "INSERT INTO users (email, password) VALUES (?, ?)",
            vec![email.into(), "password".into()],
        )
        .await;
    }
    execute(
        &db,
        "INSERT INTO wallets (name, created_at) VALUES (?, ?)",
        vec!["Household".into(), Utc::now().into()],
    )
    .await;
    for user_id in [1, 2] {
        add_member(&db, 1, user_id).await;
    }

    let provider = Arc::new(ScriptedProvider::default());
    let engine = Engine::builder()
        .database(db.clone())
        .provider(provider.clone())
        .build()
        .await
        .unwrap();

    Harness {
        engine: Arc::new(engine),
        provider,
        db,
    }
}

/// Harness with `ITEM_ID` linked for alice, owning accounts `acc-a` and
/// `acc-b`.
pub async fn linked_harness() -> Harness {
    let h = harness().await;
    h.provider.set_accounts(&["acc-a", "acc-b"]);
    h.engine.link_item(1, "public-sandbox", None).await.unwrap();
    h
}

pub async fn execute(db: &DatabaseConnection, sql: &str, values: Vec<sea_orm::Value>) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(backend, sql, values))
        .await
        .unwrap();
}

pub async fn add_wallet(db: &DatabaseConnection, name: &str) {
    execute(
        db,
        "INSERT INTO wallets (name, created_at) VALUES (?, ?)",
        vec![name.into(), Utc::now().into()],
    )
    .await;
}

pub async fn add_member(db: &DatabaseConnection, wallet_id: i32, user_id: i32) {
    execute(
        db,
        "INSERT INTO wallet_members (wallet_id, user_id) VALUES (?, ?)",
        vec![wallet_id.into(), user_id.into()],
    )
    .await;
}

pub async fn cursor_of(db: &DatabaseConnection, item_id: &str) -> Option<String> {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_sql_and_values(
            backend,
            "SELECT transactions_cursor FROM linked_items WHERE item_id = ?",
            vec![item_id.into()],
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get("", "transactions_cursor").unwrap()
}

pub async fn stored_transactions(db: &DatabaseConnection) -> i64 {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_string(
            backend,
            "SELECT COUNT(*) AS n FROM transactions",
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get("", "n").unwrap()
}

/// Internal id of a stored transaction by provider id.
pub async fn local_id(db: &DatabaseConnection, transaction_id: &str) -> i32 {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_sql_and_values(
            backend,
            "SELECT id FROM transactions WHERE transaction_id = ?",
            vec![transaction_id.into()],
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get("", "id").unwrap()
}

pub async fn pending_of(db: &DatabaseConnection, transaction_id: &str) -> bool {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_sql_and_values(
            backend,
            "SELECT pending FROM transactions WHERE transaction_id = ?",
            vec![transaction_id.into()],
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get("", "pending").unwrap()
}
