use crate::handlers::ErrorResponse;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use ecclesia_auth::Claims;
use ecclesia_models::Role;
use std::sync::Arc;

/// Authenticated user context attached to the request after token checks.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub role: Role,
}

/// Extract the bearer token from the Authorization header. A missing or
/// unusable header is a missing-credentials error (401); a token that
/// fails verification later is forbidden (403).
pub fn extract_bearer_token(
    headers: &HeaderMap,
) -> Result<String, (StatusCode, Json<ErrorResponse>)> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new(
                    "missing_auth_header",
                    "Authorization header is required",
                )),
            )
        })?
        .to_str()
        .map_err(|_| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new(
                    "invalid_auth_header",
                    "Invalid Authorization header format",
                )),
            )
        })?;

    match auth_header.strip_prefix("Bearer ") {
        Some(token) => Ok(token.to_string()),
        None => Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new(
                "invalid_auth_scheme",
                "Authorization header must use Bearer scheme",
            )),
        )),
    }
}

fn validate_token(
    state: &AppState,
    token: &str,
) -> Result<Claims, (StatusCode, Json<ErrorResponse>)> {
    state.jwt_service.validate_token(token).map_err(|e| {
        tracing::debug!("Token validation failed: {}", e);
        (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new(
                "invalid_token",
                "Invalid or expired token",
            )),
        )
    })
}

fn auth_user_from_claims(claims: &Claims) -> Result<AuthUser, (StatusCode, Json<ErrorResponse>)> {
    let user_id = claims.user_id().map_err(|_| {
        (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new(
                "invalid_token",
                "Token subject is not a valid user id",
            )),
        )
    })?;

    Ok(AuthUser {
        user_id,
        role: claims.role,
    })
}

/// Middleware to require a valid bearer token
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let token = extract_bearer_token(&headers)?;
    let claims = validate_token(&state, &token)?;
    let auth_user = auth_user_from_claims(&claims)?;

    // Add user context to request extensions
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Middleware to require the admin role on top of a valid token
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let token = extract_bearer_token(&headers)?;
    let claims = validate_token(&state, &token)?;
    let auth_user = auth_user_from_claims(&claims)?;

    if !auth_user.role.is_admin() {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new(
                "insufficient_permissions",
                "This action requires administrator privileges",
            )),
        ));
    }

    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn missing_header_is_unauthorized() {
        let headers = HeaderMap::new();
        let err = extract_bearer_token(&headers).unwrap_err();
        assert_eq!(err.0, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn non_bearer_scheme_is_unauthorized() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic abc123"));
        let err = extract_bearer_token(&headers).unwrap_err();
        assert_eq!(err.0, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn bearer_token_is_extracted() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_static("Bearer some.jwt.token"),
        );
        assert_eq!(extract_bearer_token(&headers).unwrap(), "some.jwt.token");
    }
}
