use crate::handlers::{
    bad_request, db_error_response, validation_error_response, ApiError, MessageResponse,
};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use ecclesia_database::MemberRepository;
use ecclesia_models::{Member, MemberFilter, MemberSummary, NewMember, Page, PageRequest, UpdateMember};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

#[derive(Debug, Default, Deserialize)]
pub struct ListMembersQuery {
    pub name: Option<String>,
    pub department_id: Option<i64>,
    pub cell_id: Option<i64>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Filtered, paginated member listing
/// GET /api/members
pub async fn list_members(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListMembersQuery>,
) -> Result<Json<Page<MemberSummary>>, ApiError> {
    let filter = MemberFilter {
        name: query.name,
        department_id: query.department_id,
        cell_id: query.cell_id,
    };
    let page = PageRequest::new(query.page, query.limit);

    let repo = MemberRepository::new(state.db.pool().clone());
    let members = repo
        .list(&filter, &page)
        .await
        .map_err(db_error_response)?;

    Ok(Json(members))
}

/// Create a member and its department links in one transaction
/// POST /api/members
pub async fn create_member(
    State(state): State<Arc<AppState>>,
    Json(mut request): Json<NewMember>,
) -> Result<(StatusCode, Json<Member>), ApiError> {
    request.normalize();
    request.validate().map_err(|e| validation_error_response(&e))?;

    let repo = MemberRepository::new(state.db.pool().clone());
    let member = repo.create(&request).await.map_err(db_error_response)?;

    Ok((StatusCode::CREATED, Json(member)))
}

/// Partial update; when department_ids is present the link set is synced
/// inside the same transaction
/// PUT /api/members/:id
pub async fn update_member(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(mut request): Json<UpdateMember>,
) -> Result<Json<MessageResponse>, ApiError> {
    request.normalize();
    request.validate().map_err(|e| validation_error_response(&e))?;
    if let Some(message) = request.patch_error() {
        return Err(bad_request(&message));
    }

    let repo = MemberRepository::new(state.db.pool().clone());
    repo.update(id, &request).await.map_err(db_error_response)?;

    Ok(Json(MessageResponse::new("Member updated successfully")))
}

/// DELETE /api/members/:id
pub async fn delete_member(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let repo = MemberRepository::new(state.db.pool().clone());
    repo.delete(id).await.map_err(db_error_response)?;

    Ok(Json(MessageResponse::new("Member deleted successfully")))
}
