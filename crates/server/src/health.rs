use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::server::ServerState;

#[derive(Serialize)]
pub struct Health {
    status: &'static str,
}

/// Liveness plus a database round trip.
pub async fn check(State(state): State<ServerState>) -> (StatusCode, Json<Health>) {
    match state.db.ping().await {
        Ok(()) => (StatusCode::OK, Json(Health { status: "ok" })),
        Err(err) => {
            tracing::error!("health check failed: {err}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(Health {
                    status: "unavailable",
                }),
            )
        }
    }
}
