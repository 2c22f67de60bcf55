use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::services::{ApiKeyService, AuthService, EventService, LogService, ProjectService};

pub mod auth;
mod error;
mod events;
mod ingest;
mod keys;
mod logs;
mod projects;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,

    pub config: Config,

    pub auth: AuthService,

    pub keys: ApiKeyService,

    pub projects: ProjectService,

    pub logs: LogService,

    pub events: EventService,
}

pub async fn create_app_state(config: Config) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_url,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let auth = AuthService::new(store.clone(), config.security.clone());
    let keys = ApiKeyService::new(store.clone());
    let projects = ProjectService::new(store.clone());
    let logs = LogService::new(store.clone());
    let events = EventService::new(store.clone());

    Ok(Arc::new(AppState {
        store,
        config,
        auth,
        keys,
        projects,
        logs,
        events,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config.server.cors_allowed_origins.clone();

    let protected_routes = create_protected_router(state.clone());
    let ingest_routes = create_ingest_router(state.clone());

    let api_router = Router::new()
        .merge(protected_routes)
        .merge(ingest_routes)
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/password", put(auth::change_password))
        .route("/projects", get(projects::list_projects))
        .route("/projects", post(projects::create_project))
        .route("/projects/{id}", get(projects::get_project))
        .route("/projects/{id}", put(projects::rename_project))
        .route("/projects/{id}", delete(projects::delete_project))
        .route("/projects/{id}/key", get(keys::get_key))
        .route("/projects/{id}/key", post(keys::create_key))
        .route("/projects/{id}/key", delete(keys::deactivate_key))
        .route("/projects/{id}/key/rotate", post(keys::rotate_key))
        .route("/projects/{id}/key/status", get(keys::key_status))
        .route("/projects/{id}/logs", post(logs::create_log))
        .route("/projects/{id}/logs", get(logs::list_logs))
        .route("/projects/{id}/logs/{log_id}", get(logs::get_log))
        .route("/projects/{id}/logs/{log_id}", put(logs::update_log))
        .route("/projects/{id}/logs/{log_id}", delete(logs::delete_log))
        .route("/projects/{id}/logs/level/{level}", get(logs::logs_by_level))
        .route(
            "/projects/{id}/logs/category/{category}",
            get(logs::logs_by_category),
        )
        .route("/projects/{id}/logs/tag/{tag}", get(logs::logs_by_tag))
        .route("/projects/{id}/events", post(events::create_event))
        .route("/projects/{id}/events", get(events::list_events))
        .route("/projects/{id}/events/{event_id}", get(events::get_event))
        .route("/projects/{id}/events/{event_id}", put(events::update_event))
        .route(
            "/projects/{id}/events/{event_id}",
            delete(events::delete_event),
        )
        .route_layer(middleware::from_fn_with_state(state, auth::require_user))
}

fn create_ingest_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/ingest/logs", post(ingest::ingest_log))
        .route("/ingest/events", post(ingest::ingest_event))
        .route_layer(middleware::from_fn_with_state(
            state,
            ingest::require_api_key,
        ))
}
