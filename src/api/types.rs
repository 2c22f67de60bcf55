use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::entities::{api_keys, events, logs, projects, users};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Deserializes a nullable field so that an absent key and an explicit null
/// can be told apart: absent stays `None`, null becomes `Some(None)`.
pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub created_at: String,
    pub last_login: Option<String>,
}

impl From<users::Model> for UserDto {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            display_name: model.display_name,
            role: model.role,
            created_at: model.created_at,
            last_login: model.last_login,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ============================================================================
// Projects
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ProjectRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ProjectDto {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<projects::Model> for ProjectDto {
    fn from(model: projects::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            owner_id: model.owner_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

// ============================================================================
// API keys
// ============================================================================

/// Key metadata as returned by every read path: masked form only.
#[derive(Debug, Serialize)]
pub struct ApiKeyDto {
    pub id: Uuid,
    pub project_id: Uuid,
    pub masked_key: String,
    pub is_active: bool,
    pub last_used_at: Option<String>,
    pub created_at: String,
}

impl From<api_keys::Model> for ApiKeyDto {
    fn from(model: api_keys::Model) -> Self {
        Self {
            id: model.id,
            project_id: model.project_id,
            masked_key: model.masked_key,
            is_active: model.is_active,
            last_used_at: model.last_used_at,
            created_at: model.created_at,
        }
    }
}

/// Returned once, at issue/rotate time: the only response carrying the
/// plaintext key.
#[derive(Debug, Serialize)]
pub struct IssuedKeyDto {
    pub id: Uuid,
    pub project_id: Uuid,
    pub key: String,
    pub masked_key: String,
    pub created_at: String,
}

impl IssuedKeyDto {
    #[must_use]
    pub fn new(model: api_keys::Model, plaintext: String) -> Self {
        Self {
            id: model.id,
            project_id: model.project_id,
            key: plaintext,
            masked_key: model.masked_key,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct KeyStatusDto {
    pub has_active_key: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masked_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeactivateKeyResponse {
    pub deactivated: bool,
}

// ============================================================================
// Logs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateLogRequest {
    pub level: Option<String>,
    pub category: Option<String>,
    pub message: String,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateLogRequest {
    pub level: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<String>>,
    pub message: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub tags: Option<Option<Vec<String>>>,
}

#[derive(Debug, Serialize)]
pub struct LogDto {
    pub id: Uuid,
    pub project_id: Uuid,
    pub level: String,
    pub category: Option<String>,
    pub message: String,
    pub tags: Option<Vec<String>>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<logs::Model> for LogDto {
    fn from(model: logs::Model) -> Self {
        let tags = model
            .tags
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok());

        Self {
            id: model.id,
            project_id: model.project_id,
            level: model.level,
            category: model.category,
            message: model.message,
            tags,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

// ============================================================================
// Events
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub event_type: String,
    pub event_status: Option<String>,
    pub metadata: Option<Value>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateEventRequest {
    pub event_type: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub event_status: Option<Option<String>>,
    pub metadata: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct EventDto {
    pub id: Uuid,
    pub project_id: Uuid,
    pub event_type: String,
    pub event_status: Option<String>,
    pub metadata: Option<Value>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<events::Model> for EventDto {
    fn from(model: events::Model) -> Self {
        let metadata = model
            .metadata
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok());

        Self {
            id: model.id,
            project_id: model.project_id,
            event_type: model.event_type,
            event_status: model.event_status,
            metadata,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

// ============================================================================
// Listing
// ============================================================================

#[derive(Debug, Deserialize, Default)]
pub struct ListQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}
