use crate::handlers::{
    bad_request, db_error_response, validation_error_response, ApiError, MessageResponse,
};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use ecclesia_database::CellRepository;
use ecclesia_models::{Cell, CellOverview, NewCell, UpdateCell};
use std::sync::Arc;
use validator::Validate;

/// All cells with leader name and member count
/// GET /api/cells
pub async fn list_cells(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CellOverview>>, ApiError> {
    let repo = CellRepository::new(state.db.pool().clone());
    let cells = repo.list_overview().await.map_err(db_error_response)?;

    Ok(Json(cells))
}

/// POST /api/cells
pub async fn create_cell(
    State(state): State<Arc<AppState>>,
    Json(mut request): Json<NewCell>,
) -> Result<(StatusCode, Json<Cell>), ApiError> {
    request.normalize();
    request.validate().map_err(|e| validation_error_response(&e))?;

    let repo = CellRepository::new(state.db.pool().clone());
    let cell = repo.create(&request).await.map_err(db_error_response)?;

    Ok((StatusCode::CREATED, Json(cell)))
}

/// Partial update; an explicit null clears the leader or address fields
/// PUT /api/cells/:id
pub async fn update_cell(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(mut request): Json<UpdateCell>,
) -> Result<Json<Cell>, ApiError> {
    request.normalize();
    request.validate().map_err(|e| validation_error_response(&e))?;
    if let Some(message) = request.patch_error() {
        return Err(bad_request(&message));
    }

    let repo = CellRepository::new(state.db.pool().clone());
    let cell = repo.update(id, &request).await.map_err(db_error_response)?;

    Ok(Json(cell))
}

/// DELETE /api/cells/:id — members pointing here get their reference
/// nulled by the database
pub async fn delete_cell(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let repo = CellRepository::new(state.db.pool().clone());
    repo.delete(id).await.map_err(db_error_response)?;

    Ok(Json(MessageResponse::new("Cell deleted successfully")))
}
