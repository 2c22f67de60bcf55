use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::entities::api_keys;

pub struct ApiKeyRepository {
    conn: DatabaseConnection,
}

impl ApiKeyRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn active_for_project(&self, project_id: Uuid) -> Result<Option<api_keys::Model>> {
        api_keys::Entity::find()
            .filter(api_keys::Column::ProjectId.eq(project_id))
            .filter(api_keys::Column::IsActive.eq(true))
            .one(&self.conn)
            .await
            .context("Failed to query active key for project")
    }

    pub async fn find_active_by_hash(&self, key_hash: &str) -> Result<Option<api_keys::Model>> {
        api_keys::Entity::find()
            .filter(api_keys::Column::KeyHash.eq(key_hash))
            .filter(api_keys::Column::IsActive.eq(true))
            .one(&self.conn)
            .await
            .context("Failed to query key by hash")
    }

    /// Deactivates every key the project holds and inserts the replacement as
    /// the single active row, in one transaction. A failure rolls the whole
    /// unit back, leaving the prior key active.
    pub async fn rotate(
        &self,
        project_id: Uuid,
        key_hash: &str,
        masked_key: &str,
    ) -> Result<api_keys::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let txn = self.conn.begin().await?;

        api_keys::Entity::update_many()
            .col_expr(
                api_keys::Column::IsActive,
                sea_orm::sea_query::Expr::value(false),
            )
            .filter(api_keys::Column::ProjectId.eq(project_id))
            .filter(api_keys::Column::IsActive.eq(true))
            .exec(&txn)
            .await?;

        let active = api_keys::ActiveModel {
            id: Set(Uuid::new_v4()),
            project_id: Set(project_id),
            key_hash: Set(key_hash.to_string()),
            masked_key: Set(masked_key.to_string()),
            is_active: Set(true),
            last_used_at: Set(None),
            created_at: Set(now),
        };

        let inserted = active.insert(&txn).await?;

        txn.commit().await?;

        Ok(inserted)
    }

    /// Returns how many rows were flipped; zero means there was nothing
    /// active to deactivate.
    pub async fn deactivate_active(&self, project_id: Uuid) -> Result<u64> {
        let result = api_keys::Entity::update_many()
            .col_expr(
                api_keys::Column::IsActive,
                sea_orm::sea_query::Expr::value(false),
            )
            .filter(api_keys::Column::ProjectId.eq(project_id))
            .filter(api_keys::Column::IsActive.eq(true))
            .exec(&self.conn)
            .await
            .context("Failed to deactivate key")?;

        Ok(result.rows_affected)
    }

    pub async fn touch_last_used(&self, key: api_keys::Model) -> Result<api_keys::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let mut active: api_keys::ActiveModel = key.into();
        active.last_used_at = Set(Some(now));
        active
            .update(&self.conn)
            .await
            .context("Failed to update key usage timestamp")
    }
}
