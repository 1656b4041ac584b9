use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod plaid {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct LinkTokenRequest {
        pub redirect_uri: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LinkTokenResponse {
        pub link_token: String,
        pub expiration: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExchangeRequest {
        pub public_token: String,
        pub institution_id: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExchangeResponse {
        pub item_id: String,
        pub institution: String,
        pub accounts: Vec<AccountView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: i32,
        pub account_id: String,
        pub name: String,
        pub official_name: Option<String>,
        #[serde(rename = "type")]
        pub account_type: String,
        pub subtype: Option<String>,
        pub institution: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountsResponse {
        pub accounts: Vec<AccountView>,
    }

    /// Totals of a sync run across all linked items of the caller.
    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SyncResponse {
        pub success: bool,
        pub items_synced: u64,
        pub transactions_added: u64,
        pub transactions_modified: u64,
        pub transactions_removed: u64,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum CategoryType {
        Shared,
        Individual,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionList {
        /// 1-based page number (default 1).
        pub page: Option<u64>,
        /// Page size, 1 to 100 (default 20).
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: i32,
        pub transaction_id: String,
        pub account_id: i32,
        /// Signed amount in cents, as reported by the provider.
        pub amount_minor: i64,
        pub iso_currency_code: Option<String>,
        pub date: NaiveDate,
        pub authorized_date: Option<NaiveDate>,
        pub name: String,
        pub merchant_name: Option<String>,
        pub pending: bool,
        pub payment_channel: String,
        /// Provider's primary spending category, if any.
        pub category: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
        pub page: u64,
        pub limit: u64,
        pub total_count: u64,
        pub total_pages: u64,
    }

    /// Form body of `POST /api/transactions/{id}/categorize`.
    ///
    /// `category_type` stays a plain string so an unknown value reaches the
    /// engine and is reported as an invalid category type.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategorizeForm {
        pub wallet_id: i32,
        pub category_type: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Categorized {
        pub transaction_id: i32,
        pub wallet_id: i32,
        pub category_type: CategoryType,
    }
}
