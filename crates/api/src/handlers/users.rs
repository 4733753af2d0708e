use crate::handlers::auth::password_error;
use crate::handlers::{
    db_error_response, internal_error, validation_error_response, ApiError, ErrorResponse,
    MessageResponse,
};
use crate::middleware::AuthUser;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use ecclesia_auth::PasswordHasher;
use ecclesia_database::UserRepository;
use ecclesia_models::{ChangePassword, NewUser, UpdateUser, UserProfile};
use std::sync::Arc;
use validator::Validate;

/// Current user's own profile
/// GET /api/users/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<UserProfile>, ApiError> {
    let repo = UserRepository::new(state.db.pool().clone());

    let user = repo
        .find_by_id(auth_user.user_id)
        .await
        .map_err(db_error_response)?;

    Ok(Json(UserProfile::from(user)))
}

/// Change the logged-in user's password
/// PUT /api/users/change-password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Json(request): Json<ChangePassword>,
) -> Result<Json<MessageResponse>, ApiError> {
    request.validate().map_err(|e| validation_error_response(&e))?;

    let repo = UserRepository::new(state.db.pool().clone());
    let user = repo
        .find_by_id(auth_user.user_id)
        .await
        .map_err(db_error_response)?;

    let current_ok = PasswordHasher::verify(&request.current_password, &user.password_hash)
        .map_err(|e| {
            tracing::error!("Password verification failed for user {}: {}", user.id, e);
            internal_error()
        })?;

    if !current_ok {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "wrong_password",
                "Current password is incorrect",
            )),
        ));
    }

    let new_hash = PasswordHasher::hash(&request.new_password)
        .map_err(password_error)?;

    repo.update_password(user.id, &new_hash)
        .await
        .map_err(db_error_response)?;

    Ok(Json(MessageResponse::new("Password changed successfully")))
}

/// List all accounts (admin)
/// GET /api/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserProfile>>, ApiError> {
    let repo = UserRepository::new(state.db.pool().clone());
    let users = repo.list().await.map_err(db_error_response)?;
    Ok(Json(users))
}

/// Create an account with an explicit role (admin)
/// POST /api/users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(mut request): Json<NewUser>,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    request.username = request.username.trim().to_string();
    request.validate().map_err(|e| validation_error_response(&e))?;

    let password_hash =
        PasswordHasher::hash(&request.password).map_err(password_error)?;

    let repo = UserRepository::new(state.db.pool().clone());
    let profile = repo
        .create(&request.username, &password_hash, request.role)
        .await
        .map_err(db_error_response)?;

    Ok((StatusCode::CREATED, Json(profile)))
}

/// Edit an account (admin); a blank password leaves it unchanged
/// PUT /api/users/:id
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(mut request): Json<UpdateUser>,
) -> Result<Json<UserProfile>, ApiError> {
    request.normalize();
    request.validate().map_err(|e| validation_error_response(&e))?;

    let password_hash = match &request.password {
        Some(password) => {
            Some(PasswordHasher::hash(password).map_err(password_error)?)
        }
        None => None,
    };

    let repo = UserRepository::new(state.db.pool().clone());
    let profile = repo
        .update(
            id,
            request.username.as_deref(),
            request.role,
            password_hash.as_deref(),
        )
        .await
        .map_err(db_error_response)?;

    Ok(Json(profile))
}

/// Delete an account (admin). Self-deletion is refused so an instance can
/// never lock out its last administrator by accident.
/// DELETE /api/users/:id
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if auth_user.user_id == id {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "self_delete",
                "Administrators cannot delete their own account",
            )),
        ));
    }

    let repo = UserRepository::new(state.db.pool().clone());
    repo.delete(id).await.map_err(db_error_response)?;

    Ok(StatusCode::NO_CONTENT)
}
