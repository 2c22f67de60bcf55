//! Event record ingestion and owner-scoped reads.

use serde_json::Value;
use uuid::Uuid;

use crate::db::Store;
use crate::domain::records::{
    is_valid_event_status, is_valid_event_type, is_valid_status_transition,
};
use crate::domain::{CoreError, EventPatch, NewEvent, Outcome};
use crate::entities::events;
use crate::services::projects::ProjectService;

/// Raw field updates for an event record. The nested option on
/// `event_status` distinguishes "leave unchanged" from "clear".
#[derive(Debug, Default)]
pub struct EventFieldUpdate {
    pub event_type: Option<String>,
    pub event_status: Option<Option<String>>,
    pub metadata: Option<Value>,
}

#[derive(Clone)]
pub struct EventService {
    store: Store,
    projects: ProjectService,
}

impl EventService {
    #[must_use]
    pub fn new(store: Store) -> Self {
        let projects = ProjectService::new(store.clone());
        Self { store, projects }
    }

    pub async fn create(
        &self,
        project_id: Uuid,
        event_type: String,
        event_status: Option<String>,
        metadata: Option<Value>,
    ) -> Outcome<events::Model, CoreError> {
        self.try_create(project_id, event_type, event_status, metadata)
            .await
            .into()
    }

    async fn try_create(
        &self,
        project_id: Uuid,
        event_type: String,
        event_status: Option<String>,
        metadata: Option<Value>,
    ) -> Result<events::Model, CoreError> {
        if !is_valid_event_type(&event_type) {
            return Err(CoreError::validation(
                "Invalid event type format. Must be 255 characters or less and contain only \
                 alphanumeric, underscore, hyphen, space, and dot characters",
            ));
        }

        if let Some(status) = &event_status
            && !is_valid_event_status(status)
        {
            return Err(CoreError::validation(
                "Invalid event status format. Must be 50 characters or less and contain only \
                 alphanumeric, underscore, hyphen, space, and dot characters",
            ));
        }

        if let Some(metadata) = &metadata
            && !metadata.is_object()
        {
            return Err(CoreError::validation("Event metadata must be a JSON object"));
        }

        let new_event = NewEvent {
            event_type,
            event_status,
            metadata,
        };

        Ok(self.store.events().insert(project_id, &new_event).await?)
    }

    pub async fn list_for_project(
        &self,
        project_id: Uuid,
        owner_id: Uuid,
        limit: u64,
        offset: u64,
    ) -> Outcome<Vec<events::Model>, CoreError> {
        self.try_list_for_project(project_id, owner_id, limit, offset)
            .await
            .into()
    }

    async fn try_list_for_project(
        &self,
        project_id: Uuid,
        owner_id: Uuid,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<events::Model>, CoreError> {
        self.projects
            .check_access(project_id, owner_id)
            .await
            .into_result()?;

        Ok(self
            .store
            .events()
            .list_for_project(project_id, limit, offset)
            .await?)
    }

    pub async fn get(&self, event_id: Uuid, owner_id: Uuid) -> Outcome<events::Model, CoreError> {
        match self.store.events().find_scoped(event_id, owner_id).await {
            Ok(Some(event)) => Outcome::Ok(event),
            Ok(None) => Outcome::Err(CoreError::NotFoundOrForbidden),
            Err(e) => Outcome::Err(e.into()),
        }
    }

    pub async fn update(
        &self,
        event_id: Uuid,
        owner_id: Uuid,
        update: EventFieldUpdate,
    ) -> Outcome<events::Model, CoreError> {
        self.try_update(event_id, owner_id, update).await.into()
    }

    async fn try_update(
        &self,
        event_id: Uuid,
        owner_id: Uuid,
        update: EventFieldUpdate,
    ) -> Result<events::Model, CoreError> {
        let event = self.get(event_id, owner_id).await.into_result()?;

        if let Some(event_type) = &update.event_type
            && !is_valid_event_type(event_type)
        {
            return Err(CoreError::validation("Invalid event type format"));
        }

        if let Some(next_status) = &update.event_status
            && !is_valid_status_transition(event.event_status.as_deref(), next_status.as_deref())
        {
            return Err(CoreError::validation("Invalid status transition"));
        }

        if let Some(metadata) = &update.metadata
            && !metadata.is_null()
            && !metadata.is_object()
        {
            return Err(CoreError::validation("Event metadata must be a JSON object"));
        }

        let patch = EventPatch {
            event_type: update.event_type,
            event_status: update.event_status,
            metadata: update.metadata,
        };

        Ok(self.store.events().update(event, &patch).await?)
    }

    pub async fn delete(&self, event_id: Uuid, owner_id: Uuid) -> Outcome<bool, CoreError> {
        self.try_delete(event_id, owner_id).await.into()
    }

    async fn try_delete(&self, event_id: Uuid, owner_id: Uuid) -> Result<bool, CoreError> {
        let event = self.get(event_id, owner_id).await.into_result()?;
        Ok(self.store.events().delete(event.id).await?)
    }
}
