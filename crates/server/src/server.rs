use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use std::sync::Arc;

use crate::{health, plaid, transactions, user};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

/// Resolves the Basic credentials to a user and hands it to the handlers as
/// an `Extension<user::Model>`.
async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(auth_header)) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user: Option<user::Model> = user::Entity::find()
        .filter(user::Column::Email.eq(auth_header.username()))
        .filter(user::Column::Password.eq(auth_header.password()))
        .one(&state.db)
        .await
        .map_err(|err| {
            tracing::error!("failed to resolve user: {err}");
            StatusCode::UNAUTHORIZED
        })?;

    let Some(user) = user else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Every route of the service; everything except `/health` requires Basic
/// credentials.
pub fn router(engine: Arc<Engine>, db: DatabaseConnection) -> Router {
    let state = ServerState { engine, db };

    let api = Router::new()
        .route("/api/plaid/link/token", post(plaid::link_token))
        .route("/api/plaid/link/exchange", post(plaid::exchange))
        .route("/api/plaid/accounts", get(plaid::accounts))
        .route("/api/plaid/sync", post(plaid::sync))
        .route("/api/transactions", get(transactions::list))
        .route(
            "/api/transactions/{id}/categorize",
            post(transactions::categorize),
        )
        .route(
            "/api/transactions/{id}/categorize/{wallet_id}",
            delete(transactions::uncategorize),
        )
        .route(
            "/api/wallets/{wallet_id}/transactions/uncategorized",
            get(transactions::uncategorized),
        )
        .route(
            "/api/wallets/{wallet_id}/transactions/shared",
            get(transactions::shared),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .route("/health", get(health::check))
        .merge(api)
        .with_state(state)
}

pub async fn run(engine: Engine, db: DatabaseConnection, addr: &str) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    run_with_listener(engine, db, listener).await
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(Arc::new(engine), db)).await
}
