use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, router, run, run_with_listener};

mod health;
mod plaid;
mod server;
mod transactions;
mod user;

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::UnauthorizedAccess(_) => StatusCode::FORBIDDEN,
        EngineError::TransactionNotFound(_)
        | EngineError::WalletNotFound(_)
        | EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::AlreadyCategorized(_)
        | EngineError::SyncInProgress(_)
        | EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        // Amounts only ever come from provider payloads.
        EngineError::Provider(_) | EngineError::InvalidAmount(_) => StatusCode::BAD_GATEWAY,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidCategoryType(_) | EngineError::InvalidInput(_) => {
            StatusCode::BAD_REQUEST
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Provider(provider_err) => {
            tracing::warn!("provider error: {provider_err}");
            format!("provider error: {provider_err}")
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use ledger_client::ProviderError;
    use sea_orm::DbErr;

    use super::*;

    fn status_of(err: EngineError) -> StatusCode {
        ServerError::from(err).into_response().status()
    }

    #[test]
    fn engine_unauthorized_maps_to_403() {
        assert_eq!(
            status_of(EngineError::UnauthorizedAccess("x".to_string())),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        assert_eq!(
            status_of(EngineError::TransactionNotFound("1".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(EngineError::WalletNotFound("1".to_string())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        assert_eq!(
            status_of(EngineError::AlreadyCategorized("1".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(EngineError::SyncInProgress("item".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(EngineError::ExistingKey("item".to_string())),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn engine_validation_maps_to_400() {
        assert_eq!(
            status_of(EngineError::InvalidCategoryType("x".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(EngineError::InvalidInput("x".to_string())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn provider_failure_maps_to_502() {
        let err = EngineError::Provider(ProviderError::Decode("truncated".to_string()));
        assert_eq!(status_of(err), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn unusable_provider_amount_maps_to_502() {
        let err = EngineError::InvalidAmount("non-finite amount: NaN".to_string());
        assert_eq!(status_of(err), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn database_failure_maps_to_500() {
        let err = EngineError::Database(DbErr::Custom("disk full".to_string()));
        assert_eq!(status_of(err), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
