use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use uuid::Uuid;

use super::auth::CurrentUser;
use super::types::{CreateLogRequest, ListQuery, LogDto, MessageResponse, UpdateLogRequest};
use super::validation::validate_pagination;
use super::{ApiError, ApiResponse, AppState};
use crate::services::LogFieldUpdate;

/// POST /projects/{id}/logs
pub async fn create_log(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<CreateLogRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LogDto>>), ApiError> {
    state
        .projects
        .check_access(project_id, user.id)
        .await
        .into_result()?;

    let log = state
        .logs
        .create(
            project_id,
            payload.level,
            payload.category,
            payload.message,
            payload.tags,
        )
        .await
        .into_result()?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(LogDto::from(log))),
    ))
}

/// GET /projects/{id}/logs
pub async fn list_logs(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(project_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<LogDto>>>, ApiError> {
    let (limit, offset) = validate_pagination(&query)?;

    let logs = state
        .logs
        .list_for_project(project_id, user.id, limit, offset)
        .await
        .into_result()?;

    Ok(Json(ApiResponse::success(
        logs.into_iter().map(LogDto::from).collect(),
    )))
}

/// GET /projects/{id}/logs/{log_id}
pub async fn get_log(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path((_project_id, log_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<LogDto>>, ApiError> {
    let log = state.logs.get(log_id, user.id).await.into_result()?;

    Ok(Json(ApiResponse::success(LogDto::from(log))))
}

/// PUT /projects/{id}/logs/{log_id}
pub async fn update_log(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path((_project_id, log_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateLogRequest>,
) -> Result<Json<ApiResponse<LogDto>>, ApiError> {
    let update = LogFieldUpdate {
        level: payload.level,
        category: payload.category,
        message: payload.message,
        tags: payload.tags,
    };

    let log = state
        .logs
        .update(log_id, user.id, update)
        .await
        .into_result()?;

    Ok(Json(ApiResponse::success(LogDto::from(log))))
}

/// DELETE /projects/{id}/logs/{log_id}
pub async fn delete_log(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path((_project_id, log_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.logs.delete(log_id, user.id).await.into_result()?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Log deleted".to_string(),
    })))
}

/// GET /projects/{id}/logs/level/{level}
pub async fn logs_by_level(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path((project_id, level)): Path<(Uuid, String)>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<LogDto>>>, ApiError> {
    let (limit, offset) = validate_pagination(&query)?;

    let logs = state
        .logs
        .list_by_level(project_id, user.id, &level, limit, offset)
        .await
        .into_result()?;

    Ok(Json(ApiResponse::success(
        logs.into_iter().map(LogDto::from).collect(),
    )))
}

/// GET /projects/{id}/logs/category/{category}
pub async fn logs_by_category(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path((project_id, category)): Path<(Uuid, String)>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<LogDto>>>, ApiError> {
    let (limit, offset) = validate_pagination(&query)?;

    let logs = state
        .logs
        .list_by_category(project_id, user.id, &category, limit, offset)
        .await
        .into_result()?;

    Ok(Json(ApiResponse::success(
        logs.into_iter().map(LogDto::from).collect(),
    )))
}

/// GET /projects/{id}/logs/tag/{tag}
pub async fn logs_by_tag(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path((project_id, tag)): Path<(Uuid, String)>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<LogDto>>>, ApiError> {
    let (limit, offset) = validate_pagination(&query)?;

    let logs = state
        .logs
        .list_by_tag(project_id, user.id, &tag, limit, offset)
        .await
        .into_result()?;

    Ok(Json(ApiResponse::success(
        logs.into_iter().map(LogDto::from).collect(),
    )))
}
