use crate::handlers::{
    bad_request, db_error_response, internal_error, validation_error_response, ApiError,
    ErrorResponse,
};
use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use ecclesia_auth::{AuthError, PasswordHasher};
use ecclesia_database::UserRepository;
use ecclesia_models::{Credentials, RegisterUser, Role, UserProfile};
use serde::Serialize;
use std::sync::Arc;
use validator::Validate;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: UserProfile,
}

// One response for "no such user" and "wrong password": the login endpoint
// must not enumerate accounts.
fn invalid_credentials() -> ApiError {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new("invalid_credentials", "Invalid credentials")),
    )
}

pub(crate) fn password_error(error: AuthError) -> ApiError {
    match error {
        AuthError::WeakPassword(message) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("weak_password", &message)),
        ),
        other => {
            tracing::error!("Password hashing failed: {}", other);
            internal_error()
        }
    }
}

/// Authenticate and mint a bearer token carrying the user's id and role
/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<LoginResponse>, ApiError> {
    let username = credentials.username.trim();
    if username.is_empty() || credentials.password.is_empty() {
        return Err(bad_request("Username and password are required"));
    }

    let repo = UserRepository::new(state.db.pool().clone());

    let user = repo
        .find_by_username(username)
        .await
        .map_err(db_error_response)?;

    let Some(user) = user else {
        return Err(invalid_credentials());
    };

    let password_ok =
        PasswordHasher::verify(&credentials.password, &user.password_hash).map_err(|e| {
            tracing::error!("Password verification failed for user {}: {}", user.id, e);
            internal_error()
        })?;

    if !password_ok {
        tracing::debug!("Password mismatch for user {}", user.id);
        return Err(invalid_credentials());
    }

    let token = state
        .jwt_service
        .generate_token(user.id, user.role)
        .map_err(|e| {
            tracing::error!("Token generation failed: {}", e);
            internal_error()
        })?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user: UserProfile::from(user),
    }))
}

/// Register a new account with the member role
/// POST /api/auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(mut request): Json<RegisterUser>,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    request.username = request.username.trim().to_string();
    request.validate().map_err(|e| validation_error_response(&e))?;

    let password_hash = PasswordHasher::hash(&request.password).map_err(password_error)?;

    let repo = UserRepository::new(state.db.pool().clone());
    let profile = repo
        .create(&request.username, &password_hash, Role::Member)
        .await
        .map_err(db_error_response)?;

    Ok((StatusCode::CREATED, Json(profile)))
}
