//! Provider link and sync endpoints

use api_types::plaid::{
    AccountView, AccountsResponse, ExchangeRequest, ExchangeResponse, LinkTokenRequest,
    LinkTokenResponse, SyncResponse,
};
use axum::{Extension, Json, extract::State};

use crate::{ServerError, server::ServerState, user};

fn account_view(account: engine::AccountSummary) -> AccountView {
    AccountView {
        id: account.id,
        account_id: account.account_id,
        name: account.name,
        official_name: account.official_name,
        account_type: account.account_type,
        subtype: account.subtype,
        institution: account.institution,
    }
}

pub async fn link_token(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<LinkTokenRequest>,
) -> Result<Json<LinkTokenResponse>, ServerError> {
    let token = state
        .engine
        .create_link_token(user.id, payload.redirect_uri.as_deref())
        .await?;

    Ok(Json(LinkTokenResponse {
        link_token: token.link_token,
        expiration: token.expiration,
    }))
}

pub async fn exchange(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ExchangeRequest>,
) -> Result<Json<ExchangeResponse>, ServerError> {
    let linked = state
        .engine
        .link_item(
            user.id,
            &payload.public_token,
            payload.institution_id.as_deref(),
        )
        .await?;

    Ok(Json(ExchangeResponse {
        item_id: linked.item_id,
        institution: linked.institution,
        accounts: linked.accounts.into_iter().map(account_view).collect(),
    }))
}

pub async fn accounts(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<AccountsResponse>, ServerError> {
    let accounts = state.engine.accounts_for_user(user.id).await?;

    Ok(Json(AccountsResponse {
        accounts: accounts.into_iter().map(account_view).collect(),
    }))
}

/// Syncs every linked item of the caller.
pub async fn sync(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<SyncResponse>, ServerError> {
    let totals = state.engine.sync_all(user.id).await?;

    Ok(Json(SyncResponse {
        success: true,
        items_synced: totals.items_synced,
        transactions_added: totals.added,
        transactions_modified: totals.modified,
        transactions_removed: totals.removed,
    }))
}
