use axum::{
    Extension, Json,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::types::{
    ChangePasswordRequest, LoginRequest, LoginResponse, MessageResponse, SignupRequest, UserDto,
};
use super::{ApiError, ApiResponse, AppState};
use crate::domain::Maybe;
use crate::entities::users;

/// The authenticated human caller, resolved from the bearer token and made
/// available to handlers through request extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub users::Model);

// ============================================================================
// Middleware
// ============================================================================

/// Requires a valid `Authorization: Bearer <token>` header. Every failure
/// mode (missing header, malformed token, expired, unknown subject) yields
/// the same 401.
pub async fn require_user(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token =
        extract_bearer_token(request.headers()).ok_or_else(ApiError::unauthorized)?;

    let user = state.auth.resolve_token(&token).await.into_result()?;

    tracing::Span::current().record("user_id", user.id.to_string());
    request.extensions_mut().insert(CurrentUser(user));

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

/// POST /auth/signup
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state
        .auth
        .signup(&payload.email, &payload.password, &payload.display_name)
        .await
        .into_result()?;

    tracing::info!("New user registered: {}", user.email);

    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

/// POST /auth/login
/// Exchanges credentials for a short-lived bearer token.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    if payload.email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    // Unknown email and wrong password are the same answer.
    let user = match state.auth.authenticate(&payload.email, &payload.password).await {
        Maybe::Some(user) => user,
        Maybe::Nothing => {
            return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
        }
    };

    let access_token = state.auth.issue_token(&user).into_result()?;

    Ok(Json(ApiResponse::success(LoginResponse {
        access_token,
        token_type: "bearer".to_string(),
    })))
}

/// GET /auth/me
pub async fn me(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Json<ApiResponse<UserDto>> {
    Json(ApiResponse::success(UserDto::from(user)))
}

/// PUT /auth/password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .auth
        .change_password(user.id, &payload.current_password, &payload.new_password)
        .await
        .into_result()?;

    tracing::info!("Password changed for user: {}", user.email);

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Password updated successfully".to_string(),
    })))
}
