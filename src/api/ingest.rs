//! Machine ingestion endpoints, authenticated by the `X-Api-Key` header.
//!
//! The key binds the request to exactly one project; the body never names a
//! project and cannot write outside the key's own.

use axum::{
    Extension, Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use uuid::Uuid;

use super::types::{CreateEventRequest, CreateLogRequest, EventDto, LogDto};
use super::{ApiError, ApiResponse, AppState};
use crate::domain::Maybe;

/// The project identity bound to a verified API key.
#[derive(Debug, Clone, Copy)]
pub struct KeyProject(pub Uuid);

// ============================================================================
// Middleware
// ============================================================================

/// Requires a valid, active `X-Api-Key`. Unknown, inactive, and malformed
/// keys all produce the same 401; the response must not reveal whether a
/// presented key ever existed.
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let presented =
        extract_api_key(request.headers()).ok_or_else(ApiError::unauthorized)?;

    match state.keys.authenticate(&presented).await {
        Maybe::Some(key) => {
            request.extensions_mut().insert(KeyProject(key.project_id));
            Ok(next.run(request).await)
        }
        Maybe::Nothing => Err(ApiError::unauthorized()),
    }
}

fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(api_key) = headers.get("X-Api-Key")
        && let Ok(key_str) = api_key.to_str()
    {
        return Some(key_str.to_string());
    }

    None
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /ingest/logs
pub async fn ingest_log(
    State(state): State<Arc<AppState>>,
    Extension(KeyProject(project_id)): Extension<KeyProject>,
    Json(payload): Json<CreateLogRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LogDto>>), ApiError> {
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

/// POST /ingest/events
pub async fn ingest_event(
    State(state): State<Arc<AppState>>,
    Extension(KeyProject(project_id)): Extension<KeyProject>,
    Json(payload): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<ApiResponse<EventDto>>), ApiError> {
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
