use crate::handlers::{
    db_error_response, validation_error_response, ApiError, MessageResponse,
};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use ecclesia_database::DepartmentRepository;
use ecclesia_models::{
    Department, DepartmentWithMemberCount, NewDepartment, RosterEntry, SyncDepartmentMembers,
};
use std::sync::Arc;
use validator::Validate;

/// All departments with member counts
/// GET /api/departments
pub async fn list_departments(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DepartmentWithMemberCount>>, ApiError> {
    let repo = DepartmentRepository::new(state.db.pool().clone());
    let departments = repo
        .list_with_member_count()
        .await
        .map_err(db_error_response)?;

    Ok(Json(departments))
}

/// POST /api/departments
pub async fn create_department(
    State(state): State<Arc<AppState>>,
    Json(mut request): Json<NewDepartment>,
) -> Result<(StatusCode, Json<Department>), ApiError> {
    request.normalize();
    request.validate().map_err(|e| validation_error_response(&e))?;

    let repo = DepartmentRepository::new(state.db.pool().clone());
    let department = repo.create(&request.name).await.map_err(db_error_response)?;

    Ok((StatusCode::CREATED, Json(department)))
}

/// PUT /api/departments/:id
pub async fn update_department(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(mut request): Json<NewDepartment>,
) -> Result<Json<Department>, ApiError> {
    request.normalize();
    request.validate().map_err(|e| validation_error_response(&e))?;

    let repo = DepartmentRepository::new(state.db.pool().clone());
    let department = repo
        .rename(id, &request.name)
        .await
        .map_err(db_error_response)?;

    Ok(Json(department))
}

/// DELETE /api/departments/:id
pub async fn delete_department(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let repo = DepartmentRepository::new(state.db.pool().clone());
    repo.delete(id).await.map_err(db_error_response)?;

    Ok(Json(MessageResponse::new("Department deleted successfully")))
}

/// Every member, flagged with whether they belong to this department
/// GET /api/departments/:id/members
pub async fn department_members(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<RosterEntry>>, ApiError> {
    let repo = DepartmentRepository::new(state.db.pool().clone());
    let roster = repo.roster(id).await.map_err(db_error_response)?;

    Ok(Json(roster))
}

/// Replace the department's member set with exactly the submitted ids
/// PUT /api/departments/:id/members
pub async fn sync_department_members(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<SyncDepartmentMembers>,
) -> Result<Json<MessageResponse>, ApiError> {
    let repo = DepartmentRepository::new(state.db.pool().clone());
    repo.sync_members(id, &request.member_ids)
        .await
        .map_err(db_error_response)?;

    Ok(Json(MessageResponse::new(
        "Department members updated successfully",
    )))
}
