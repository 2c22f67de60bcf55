use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use uuid::Uuid;

use super::auth::CurrentUser;
use super::types::{
    CreateEventRequest, EventDto, ListQuery, MessageResponse, UpdateEventRequest,
};
use super::validation::validate_pagination;
use super::{ApiError, ApiResponse, AppState};
use crate::services::EventFieldUpdate;

/// POST /projects/{id}/events
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<ApiResponse<EventDto>>), ApiError> {
    state
        .projects
        .check_access(project_id, user.id)
        .await
        .into_result()?;

    let event = state
        .events
        .create(
            project_id,
            payload.event_type,
            payload.event_status,
            payload.metadata,
        )
        .await
        .into_result()?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(EventDto::from(event))),
    ))
}

/// GET /projects/{id}/events
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(project_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<EventDto>>>, ApiError> {
    let (limit, offset) = validate_pagination(&query)?;

    let events = state
        .events
        .list_for_project(project_id, user.id, limit, offset)
        .await
        .into_result()?;

    Ok(Json(ApiResponse::success(
        events.into_iter().map(EventDto::from).collect(),
    )))
}

/// GET /projects/{id}/events/{event_id}
pub async fn get_event(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path((_project_id, event_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<EventDto>>, ApiError> {
    let event = state.events.get(event_id, user.id).await.into_result()?;

    Ok(Json(ApiResponse::success(EventDto::from(event))))
}

/// PUT /projects/{id}/events/{event_id}
pub async fn update_event(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path((_project_id, event_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateEventRequest>,
) -> Result<Json<ApiResponse<EventDto>>, ApiError> {
    let update = EventFieldUpdate {
        event_type: payload.event_type,
        event_status: payload.event_status,
        metadata: payload.metadata,
    };

    let event = state
        .events
        .update(event_id, user.id, update)
        .await
        .into_result()?;

    Ok(Json(ApiResponse::success(EventDto::from(event))))
}

/// DELETE /projects/{id}/events/{event_id}
pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path((_project_id, event_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.events.delete(event_id, user.id).await.into_result()?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Event deleted".to_string(),
    })))
}
