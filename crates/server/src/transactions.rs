//! Transactions API endpoints

use api_types::transaction::{
    CategorizeForm, Categorized, CategoryType as ApiCategoryType, TransactionList,
    TransactionListResponse, TransactionView,
};
use axum::{
    Extension, Form, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState, user};

fn map_category_type(category_type: engine::CategoryType) -> ApiCategoryType {
    match category_type {
        engine::CategoryType::Shared => ApiCategoryType::Shared,
        engine::CategoryType::Individual => ApiCategoryType::Individual,
    }
}

fn transaction_view(tx: engine::Transaction) -> TransactionView {
    let category = tx
        .metadata
        .personal_finance_category
        .and_then(|category| category.primary);
    TransactionView {
        id: tx.id,
        transaction_id: tx.transaction_id,
        account_id: tx.account_id,
        amount_minor: tx.amount.cents(),
        iso_currency_code: tx.iso_currency_code,
        date: tx.date,
        authorized_date: tx.authorized_date,
        name: tx.name,
        merchant_name: tx.merchant_name,
        pending: tx.pending,
        payment_channel: tx.payment_channel,
        category,
    }
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<TransactionList>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let page = state
        .engine
        .transactions_page(
            user.id,
            engine::TransactionPageRequest {
                page: query.page,
                limit: query.limit,
            },
        )
        .await?;

    Ok(Json(TransactionListResponse {
        transactions: page.transactions.into_iter().map(transaction_view).collect(),
        page: page.page,
        limit: page.limit,
        total_count: page.total_count,
        total_pages: page.total_pages,
    }))
}

pub async fn uncategorized(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(wallet_id): Path<i32>,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    let txs = state
        .engine
        .uncategorized_transactions(user.id, wallet_id)
        .await?;
    Ok(Json(txs.into_iter().map(transaction_view).collect()))
}

pub async fn shared(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(wallet_id): Path<i32>,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    let txs = state.engine.shared_transactions(user.id, wallet_id).await?;
    Ok(Json(txs.into_iter().map(transaction_view).collect()))
}

pub async fn categorize(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Form(form): Form<CategorizeForm>,
) -> Result<Json<Categorized>, ServerError> {
    state
        .engine
        .categorize(user.id, id, form.wallet_id, &form.category_type)
        .await?;
    let category_type = engine::CategoryType::try_from(form.category_type.as_str())?;

    Ok(Json(Categorized {
        transaction_id: id,
        wallet_id: form.wallet_id,
        category_type: map_category_type(category_type),
    }))
}

pub async fn uncategorize(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path((id, wallet_id)): Path<(i32, i32)>,
) -> Result<StatusCode, ServerError> {
    state.engine.uncategorize(user.id, id, wallet_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
