use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::sync::Arc;
use uuid::Uuid;

use super::auth::CurrentUser;
use super::types::{MessageResponse, ProjectDto, ProjectRequest};
use super::{ApiError, ApiResponse, AppState};

/// GET /projects
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<ProjectDto>>>, ApiError> {
    let projects = state.projects.list_for_owner(user.id).await.into_result()?;

    Ok(Json(ApiResponse::success(
        projects.into_iter().map(ProjectDto::from).collect(),
    )))
}

/// POST /projects
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<ProjectRequest>,
) -> Result<Json<ApiResponse<ProjectDto>>, ApiError> {
    let project = state
        .projects
        .create(user.id, &payload.name)
        .await
        .into_result()?;

    tracing::info!("Project created: {} ({})", project.name, project.id);

    Ok(Json(ApiResponse::success(ProjectDto::from(project))))
}

/// GET /projects/{id}
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<ApiResponse<ProjectDto>>, ApiError> {
    let project = state
        .projects
        .check_access(project_id, user.id)
        .await
        .into_result()?;

    Ok(Json(ApiResponse::success(ProjectDto::from(project))))
}

/// PUT /projects/{id}
pub async fn rename_project(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<ProjectRequest>,
) -> Result<Json<ApiResponse<ProjectDto>>, ApiError> {
    let project = state
        .projects
        .rename(project_id, user.id, &payload.name)
        .await
        .into_result()?;

    Ok(Json(ApiResponse::success(ProjectDto::from(project))))
}

/// DELETE /projects/{id}
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .projects
        .delete(project_id, user.id)
        .await
        .into_result()?;

    tracing::info!("Project deleted: {project_id}");

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Project deleted".to_string(),
    })))
}
