use crate::handlers::{db_error_response, ApiError};
use crate::AppState;
use axum::{extract::State, Json};
use ecclesia_database::{Summary, SummaryRepository};
use std::sync::Arc;

/// Dashboard totals
/// GET /api/summary
pub async fn summary(State(state): State<Arc<AppState>>) -> Result<Json<Summary>, ApiError> {
    let repo = SummaryRepository::new(state.db.pool().clone());
    let totals = repo.totals().await.map_err(db_error_response)?;

    Ok(Json(totals))
}
