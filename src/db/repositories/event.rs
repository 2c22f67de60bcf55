use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::domain::{EventPatch, NewEvent};
use crate::entities::{events, projects};

pub struct EventRepository {
    conn: DatabaseConnection,
}

impl EventRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, project_id: Uuid, event: &NewEvent) -> Result<events::Model> {
        let now = chrono::Utc::now().to_rfc3339();
        let metadata = event
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .context("Failed to encode event metadata")?;

        let active = events::ActiveModel {
            id: Set(Uuid::new_v4()),
            event_type: Set(event.event_type.clone()),
            event_status: Set(event.event_status.clone()),
            project_id: Set(project_id),
            metadata: Set(metadata),
            created_at: Set(now),
            updated_at: Set(None),
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert event")
    }

    pub async fn list_for_project(
        &self,
        project_id: Uuid,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<events::Model>> {
        events::Entity::find()
            .filter(events::Column::ProjectId.eq(project_id))
            .order_by_desc(events::Column::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(&self.conn)
            .await
            .context("Failed to list events for project")
    }

    /// Resolves an event through a join against its owning project filtered
    /// by the caller, so absent and foreign records look identical.
    pub async fn find_scoped(
        &self,
        event_id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<events::Model>> {
        events::Entity::find()
            .filter(events::Column::Id.eq(event_id))
            .inner_join(projects::Entity)
            .filter(projects::Column::OwnerId.eq(owner_id))
            .one(&self.conn)
            .await
            .context("Failed to query event by ID and owner")
    }

    pub async fn update(&self, event: events::Model, patch: &EventPatch) -> Result<events::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let mut active: events::ActiveModel = event.into();

        if let Some(event_type) = &patch.event_type {
            active.event_type = Set(event_type.clone());
        }
        if let Some(status) = &patch.event_status {
            active.event_status = Set(status.clone());
        }
        if let Some(metadata) = &patch.metadata {
            let encoded = if metadata.is_null() {
                None
            } else {
                Some(serde_json::to_string(metadata).context("Failed to encode event metadata")?)
            };
            active.metadata = Set(encoded);
        }
        active.updated_at = Set(Some(now));

        active
            .update(&self.conn)
            .await
            .context("Failed to update event")
    }

    pub async fn delete(&self, event_id: Uuid) -> Result<bool> {
        let result = events::Entity::delete_by_id(event_id)
            .exec(&self.conn)
            .await
            .context("Failed to delete event")?;

        Ok(result.rows_affected > 0)
    }
}
