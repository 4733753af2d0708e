pub mod auth;
pub mod cells;
pub mod departments;
pub mod health;
pub mod members;
pub mod summary;
pub mod users;

use axum::http::StatusCode;
use axum::Json;
use ecclesia_database::DatabaseError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Translate a repository error into the HTTP error taxonomy. Driver-level
/// failures are logged here and collapsed to a generic 500 so raw database
/// detail never reaches a client.
pub fn db_error_response(error: DatabaseError) -> ApiError {
    match error {
        DatabaseError::NotFound(message) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("not_found", &message)),
        ),
        DatabaseError::DuplicateEntry(message) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse::new("conflict", &message)),
        ),
        DatabaseError::ForeignKeyViolation(_) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "invalid_reference",
                "A referenced entity does not exist",
            )),
        ),
        DatabaseError::InvalidInput(message) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("validation_error", &message)),
        ),
        other => {
            tracing::error!("Database error: {}", other);
            internal_error()
        }
    }
}

pub fn validation_error_response(errors: &validator::ValidationErrors) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new("validation_error", &errors.to_string())),
    )
}

pub fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new("validation_error", message)),
    )
}

pub fn internal_error() -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("internal_error", "Internal server error")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_the_conventional_status_codes() {
        let (status, _) = db_error_response(DatabaseError::not_found("member", 7));
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = db_error_response(DatabaseError::duplicate("department", "name"));
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) =
            db_error_response(DatabaseError::ForeignKeyViolation("bad reference".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = db_error_response(DatabaseError::Other("boom".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn internal_errors_carry_no_detail() {
        let (_, Json(body)) = db_error_response(DatabaseError::Other("secret detail".into()));
        assert_eq!(body.message, "Internal server error");
        assert!(!body.message.contains("secret"));
    }
}
