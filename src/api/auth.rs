use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, LoginRequest, RegisterRequest};
use crate::db::NewUser;
use crate::services::auth::{AuthenticatedIdentity, LoginResult};

// ============================================================================
// Middleware
// ============================================================================

/// Authentication middleware for protected routes: verifies the
/// `Authorization: Bearer <token>` header and injects the resulting
/// [`AuthenticatedIdentity`] as a request extension. Core operations only
/// ever see the identity by parameter, never ambient request state.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let Some(token) = extract_bearer_token(&headers) else {
        return Err(ApiError::Unauthorized(
            "Access denied. No token provided.".to_string(),
        ));
    };

    let identity = state
        .tokens
        .verify(&token)
        .map_err(|_| ApiError::Forbidden("Invalid or expired token.".to_string()))?;

    tracing::Span::current().record("user_id", identity.id);

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Role gate layered inside [`authenticate`] on admin-only routes.
pub async fn require_admin(request: Request, next: Next) -> Result<impl IntoResponse, ApiError> {
    let is_admin = request
        .extensions()
        .get::<AuthenticatedIdentity>()
        .is_some_and(AuthenticatedIdentity::is_admin);

    if !is_admin {
        return Err(ApiError::Forbidden("Access denied".to_string()));
    }

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<super::MessageResponse>>), ApiError> {
    state
        .auth
        .register(NewUser {
            username: payload.username,
            email: payload.email,
            password: payload.password,
            display_name: payload.display_name,
            bio: payload.bio,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(super::MessageResponse::new(
            "User registered successfully",
        ))),
    ))
}

/// POST /auth/login
/// Verify credentials and hand out a bearer token.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResult>>, ApiError> {
    let result = state
        .auth
        .login(&state.tokens, &payload.username, &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(result)))
}
