use crate::handlers::{db_error_response, ApiError};
use crate::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthResponse>, ApiError> {
    state.db.ping().await.map_err(db_error_response)?;
    Ok(Json(HealthResponse { status: "ok" }))
}
