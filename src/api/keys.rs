use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use uuid::Uuid;

use super::auth::CurrentUser;
use super::types::{ApiKeyDto, DeactivateKeyResponse, IssuedKeyDto, KeyStatusDto};
use super::{ApiError, ApiResponse, AppState};
use crate::domain::Maybe;

/// GET /projects/{id}/key
/// Active key metadata: masked form only, never the plaintext.
pub async fn get_key(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<ApiResponse<ApiKeyDto>>, ApiError> {
    state
        .projects
        .check_access(project_id, user.id)
        .await
        .into_result()?;

    match state.keys.lookup_by_project(project_id).await {
        Maybe::Some(key) => Ok(Json(ApiResponse::success(ApiKeyDto::from(key)))),
        Maybe::Nothing => Err(ApiError::NotFound("API key not found".to_string())),
    }
}

/// POST /projects/{id}/key
/// Issues a key; the plaintext appears in this response and nowhere else.
pub async fn create_key(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(project_id): Path<Uuid>,
) -> Result<(StatusCode, Json<ApiResponse<IssuedKeyDto>>), ApiError> {
    state
        .projects
        .check_access(project_id, user.id)
        .await
        .into_result()?;

    let (key, plaintext) = state.keys.create(project_id).await.into_result()?;

    tracing::info!("API key issued for project {project_id}");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(IssuedKeyDto::new(key, plaintext))),
    ))
}

/// POST /projects/{id}/key/rotate
/// Replaces the active key; the old secret stops working immediately.
pub async fn rotate_key(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<ApiResponse<IssuedKeyDto>>, ApiError> {
    state
        .projects
        .check_access(project_id, user.id)
        .await
        .into_result()?;

    let (key, plaintext) = state.keys.rotate(project_id).await.into_result()?;

    tracing::info!("API key rotated for project {project_id}");

    Ok(Json(ApiResponse::success(IssuedKeyDto::new(key, plaintext))))
}

/// DELETE /projects/{id}/key
/// Idempotent: deactivating an already-keyless project reports `false`.
pub async fn deactivate_key(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeactivateKeyResponse>>, ApiError> {
    state
        .projects
        .check_access(project_id, user.id)
        .await
        .into_result()?;

    let deactivated = state.keys.deactivate(project_id).await.into_result()?;

    Ok(Json(ApiResponse::success(DeactivateKeyResponse {
        deactivated,
    })))
}

/// GET /projects/{id}/key/status
pub async fn key_status(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<ApiResponse<KeyStatusDto>>, ApiError> {
    state
        .projects
        .check_access(project_id, user.id)
        .await
        .into_result()?;

    let status = match state.keys.lookup_by_project(project_id).await {
        Maybe::Some(key) => KeyStatusDto {
            has_active_key: true,
            masked_key: Some(key.masked_key),
            last_used_at: key.last_used_at,
        },
        Maybe::Nothing => KeyStatusDto {
            has_active_key: false,
            masked_key: None,
            last_used_at: None,
        },
    };

    Ok(Json(ApiResponse::success(status)))
}
