use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        // Project names are unique per owner, not globally.
        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_projects_owner_name ON projects(owner_id, name)",
        )
        .await?;

        // At most one active key per project, enforced by the store so that
        // concurrent rotations cannot both commit an active row.
        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_api_keys_one_active ON api_keys(project_id) WHERE is_active = 1",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_logs_project_created ON logs(project_id, created_at)",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_events_project_created ON events(project_id, created_at)",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        conn.execute_unprepared("DROP INDEX IF EXISTS idx_events_project_created")
            .await?;
        conn.execute_unprepared("DROP INDEX IF EXISTS idx_logs_project_created")
            .await?;
        conn.execute_unprepared("DROP INDEX IF EXISTS idx_api_keys_one_active")
            .await?;
        conn.execute_unprepared("DROP INDEX IF EXISTS idx_projects_owner_name")
            .await?;

        Ok(())
    }
}
