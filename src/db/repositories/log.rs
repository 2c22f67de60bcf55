use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::domain::{LogPatch, NewLog};
use crate::entities::{logs, projects};

pub struct LogRepository {
    conn: DatabaseConnection,
}

impl LogRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, project_id: Uuid, log: &NewLog) -> Result<logs::Model> {
        let now = chrono::Utc::now().to_rfc3339();
        let tags = log
            .tags
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .context("Failed to encode log tags")?;

        let active = logs::ActiveModel {
            id: Set(Uuid::new_v4()),
            project_id: Set(project_id),
            level: Set(log.level.as_str().to_string()),
            category: Set(log.category.clone()),
            message: Set(log.message.clone()),
            tags: Set(tags),
            created_at: Set(now),
            updated_at: Set(None),
        };

        active.insert(&self.conn).await.context("Failed to insert log")
    }

    pub async fn list_for_project(
        &self,
        project_id: Uuid,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<logs::Model>> {
        logs::Entity::find()
            .filter(logs::Column::ProjectId.eq(project_id))
            .order_by_desc(logs::Column::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(&self.conn)
            .await
            .context("Failed to list logs for project")
    }

    pub async fn list_by_level(
        &self,
        project_id: Uuid,
        level: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<logs::Model>> {
        logs::Entity::find()
            .filter(logs::Column::ProjectId.eq(project_id))
            .filter(logs::Column::Level.eq(level))
            .order_by_desc(logs::Column::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(&self.conn)
            .await
            .context("Failed to list logs by level")
    }

    pub async fn list_by_category(
        &self,
        project_id: Uuid,
        category: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<logs::Model>> {
        logs::Entity::find()
            .filter(logs::Column::ProjectId.eq(project_id))
            .filter(logs::Column::Category.eq(category))
            .order_by_desc(logs::Column::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(&self.conn)
            .await
            .context("Failed to list logs by category")
    }

    /// Unpaginated project scan used by the tag filter, which decodes the
    /// stored JSON arrays on the Rust side.
    pub async fn list_all_for_project(&self, project_id: Uuid) -> Result<Vec<logs::Model>> {
        logs::Entity::find()
            .filter(logs::Column::ProjectId.eq(project_id))
            .order_by_desc(logs::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to scan logs for project")
    }

    /// Resolves a log through a join against its owning project filtered by
    /// the caller, so absent and foreign records look identical.
    pub async fn find_scoped(&self, log_id: Uuid, owner_id: Uuid) -> Result<Option<logs::Model>> {
        logs::Entity::find()
            .filter(logs::Column::Id.eq(log_id))
            .inner_join(projects::Entity)
            .filter(projects::Column::OwnerId.eq(owner_id))
            .one(&self.conn)
            .await
            .context("Failed to query log by ID and owner")
    }

    pub async fn update(&self, log: logs::Model, patch: &LogPatch) -> Result<logs::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let mut active: logs::ActiveModel = log.into();

        if let Some(level) = patch.level {
            active.level = Set(level.as_str().to_string());
        }
        if let Some(category) = &patch.category {
            active.category = Set(category.clone());
        }
        if let Some(message) = &patch.message {
            active.message = Set(message.clone());
        }
        if let Some(tags) = &patch.tags {
            let encoded = tags
                .as_ref()
                .map(serde_json::to_string)
                .transpose()
                .context("Failed to encode log tags")?;
            active.tags = Set(encoded);
        }
        active.updated_at = Set(Some(now));

        active.update(&self.conn).await.context("Failed to update log")
    }

    pub async fn delete(&self, log_id: Uuid) -> Result<bool> {
        let result = logs::Entity::delete_by_id(log_id)
            .exec(&self.conn)
            .await
            .context("Failed to delete log")?;

        Ok(result.rows_affected > 0)
    }
}
