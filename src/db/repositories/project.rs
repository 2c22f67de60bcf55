use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use crate::entities::{api_keys, events, logs, projects};

pub struct ProjectRepository {
    conn: DatabaseConnection,
}

impl ProjectRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, owner_id: Uuid, name: &str) -> Result<projects::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = projects::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            owner_id: Set(owner_id),
            created_at: Set(now),
            updated_at: Set(None),
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert project")
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<projects::Model>> {
        projects::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query project by ID")
    }

    /// Single lookup filtered on both id and owner; callers treat a miss as
    /// "not found or access denied" without learning which.
    pub async fn find_owned(
        &self,
        project_id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<projects::Model>> {
        projects::Entity::find()
            .filter(projects::Column::Id.eq(project_id))
            .filter(projects::Column::OwnerId.eq(owner_id))
            .one(&self.conn)
            .await
            .context("Failed to query project by ID and owner")
    }

    pub async fn name_taken(
        &self,
        owner_id: Uuid,
        name: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool> {
        let mut query = projects::Entity::find()
            .filter(projects::Column::OwnerId.eq(owner_id))
            .filter(projects::Column::Name.eq(name));

        if let Some(id) = exclude {
            query = query.filter(projects::Column::Id.ne(id));
        }

        let existing = query
            .one(&self.conn)
            .await
            .context("Failed to check project name availability")?;

        Ok(existing.is_some())
    }

    pub async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<projects::Model>> {
        projects::Entity::find()
            .filter(projects::Column::OwnerId.eq(owner_id))
            .order_by_desc(projects::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list projects for owner")
    }

    pub async fn rename(&self, project: projects::Model, new_name: &str) -> Result<projects::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let mut active: projects::ActiveModel = project.into();
        active.name = Set(new_name.to_string());
        active.updated_at = Set(Some(now));
        active
            .update(&self.conn)
            .await
            .context("Failed to rename project")
    }

    /// Deletes the project and every dependent record in one transaction so
    /// no orphaned logs, events, or keys survive.
    pub async fn delete_cascade(&self, project_id: Uuid) -> Result<bool> {
        let txn = self.conn.begin().await?;

        logs::Entity::delete_many()
            .filter(logs::Column::ProjectId.eq(project_id))
            .exec(&txn)
            .await?;

        events::Entity::delete_many()
            .filter(events::Column::ProjectId.eq(project_id))
            .exec(&txn)
            .await?;

        api_keys::Entity::delete_many()
            .filter(api_keys::Column::ProjectId.eq(project_id))
            .exec(&txn)
            .await?;

        let result = projects::Entity::delete_by_id(project_id).exec(&txn).await?;

        txn.commit().await?;

        let removed = result.rows_affected > 0;
        if removed {
            info!("Removed project {project_id} and its records");
        }
        Ok(removed)
    }
}
