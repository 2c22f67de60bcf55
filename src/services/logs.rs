//! Log record ingestion and owner-scoped reads.
//!
//! `create` is reached by machine callers with the project bound to their
//! key, or by human callers after the ownership guard; every other operation
//! runs the guard (or an owner-filtered join) itself.

use uuid::Uuid;

use crate::db::Store;
use crate::domain::{CoreError, LogLevel, LogPatch, NewLog, Outcome};
use crate::entities::logs;
use crate::services::projects::ProjectService;

/// Raw field updates for a log record; string-typed where the API is
/// string-typed, validated here before they become a [`LogPatch`].
#[derive(Debug, Default)]
pub struct LogFieldUpdate {
    pub level: Option<String>,
    pub category: Option<Option<String>>,
    pub message: Option<String>,
    pub tags: Option<Option<Vec<String>>>,
}

#[derive(Clone)]
pub struct LogService {
    store: Store,
    projects: ProjectService,
}

impl LogService {
    #[must_use]
    pub fn new(store: Store) -> Self {
        let projects = ProjectService::new(store.clone());
        Self { store, projects }
    }

    pub async fn create(
        &self,
        project_id: Uuid,
        level: Option<String>,
        category: Option<String>,
        message: String,
        tags: Option<Vec<String>>,
    ) -> Outcome<logs::Model, CoreError> {
        self.try_create(project_id, level, category, message, tags)
            .await
            .into()
    }

    async fn try_create(
        &self,
        project_id: Uuid,
        level: Option<String>,
        category: Option<String>,
        message: String,
        tags: Option<Vec<String>>,
    ) -> Result<logs::Model, CoreError> {
        let level = parse_level(level.as_deref().unwrap_or("info"))?;

        if message.trim().is_empty() {
            return Err(CoreError::validation("Log message is required"));
        }

        let new_log = NewLog {
            level,
            category,
            message,
            tags,
        };

        Ok(self.store.logs().insert(project_id, &new_log).await?)
    }

    pub async fn list_for_project(
        &self,
        project_id: Uuid,
        owner_id: Uuid,
        limit: u64,
        offset: u64,
    ) -> Outcome<Vec<logs::Model>, CoreError> {
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
    ) -> Result<Vec<logs::Model>, CoreError> {
        self.projects
            .check_access(project_id, owner_id)
            .await
            .into_result()?;

        Ok(self
            .store
            .logs()
            .list_for_project(project_id, limit, offset)
            .await?)
    }

    pub async fn list_by_level(
        &self,
        project_id: Uuid,
        owner_id: Uuid,
        level: &str,
        limit: u64,
        offset: u64,
    ) -> Outcome<Vec<logs::Model>, CoreError> {
        self.try_list_by_level(project_id, owner_id, level, limit, offset)
            .await
            .into()
    }

    async fn try_list_by_level(
        &self,
        project_id: Uuid,
        owner_id: Uuid,
        level: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<logs::Model>, CoreError> {
        let level = parse_level(level)?;

        self.projects
            .check_access(project_id, owner_id)
            .await
            .into_result()?;

        Ok(self
            .store
            .logs()
            .list_by_level(project_id, level.as_str(), limit, offset)
            .await?)
    }

    pub async fn list_by_category(
        &self,
        project_id: Uuid,
        owner_id: Uuid,
        category: &str,
        limit: u64,
        offset: u64,
    ) -> Outcome<Vec<logs::Model>, CoreError> {
        self.try_list_by_category(project_id, owner_id, category, limit, offset)
            .await
            .into()
    }

    async fn try_list_by_category(
        &self,
        project_id: Uuid,
        owner_id: Uuid,
        category: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<logs::Model>, CoreError> {
        self.projects
            .check_access(project_id, owner_id)
            .await
            .into_result()?;

        Ok(self
            .store
            .logs()
            .list_by_category(project_id, category, limit, offset)
            .await?)
    }

    /// Tag membership is decided over the decoded JSON arrays after the
    /// ownership check; the store has no array operators.
    pub async fn list_by_tag(
        &self,
        project_id: Uuid,
        owner_id: Uuid,
        tag: &str,
        limit: u64,
        offset: u64,
    ) -> Outcome<Vec<logs::Model>, CoreError> {
        self.try_list_by_tag(project_id, owner_id, tag, limit, offset)
            .await
            .into()
    }

    async fn try_list_by_tag(
        &self,
        project_id: Uuid,
        owner_id: Uuid,
        tag: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<logs::Model>, CoreError> {
        self.projects
            .check_access(project_id, owner_id)
            .await
            .into_result()?;

        let rows = self.store.logs().list_all_for_project(project_id).await?;

        let matching = rows
            .into_iter()
            .filter(|row| {
                row.tags.as_deref().is_some_and(|raw| {
                    serde_json::from_str::<Vec<String>>(raw)
                        .map(|tags| tags.iter().any(|t| t == tag))
                        .unwrap_or(false)
                })
            })
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect();

        Ok(matching)
    }

    pub async fn get(&self, log_id: Uuid, owner_id: Uuid) -> Outcome<logs::Model, CoreError> {
        match self.store.logs().find_scoped(log_id, owner_id).await {
            Ok(Some(log)) => Outcome::Ok(log),
            Ok(None) => Outcome::Err(CoreError::NotFoundOrForbidden),
            Err(e) => Outcome::Err(e.into()),
        }
    }

    pub async fn update(
        &self,
        log_id: Uuid,
        owner_id: Uuid,
        update: LogFieldUpdate,
    ) -> Outcome<logs::Model, CoreError> {
        self.try_update(log_id, owner_id, update).await.into()
    }

    async fn try_update(
        &self,
        log_id: Uuid,
        owner_id: Uuid,
        update: LogFieldUpdate,
    ) -> Result<logs::Model, CoreError> {
        let log = self.get(log_id, owner_id).await.into_result()?;

        let level = update.level.as_deref().map(parse_level).transpose()?;

        if let Some(message) = &update.message
            && message.trim().is_empty()
        {
            return Err(CoreError::validation("Log message cannot be blank"));
        }

        let patch = LogPatch {
            level,
            category: update.category,
            message: update.message,
            tags: update.tags,
        };

        Ok(self.store.logs().update(log, &patch).await?)
    }

    pub async fn delete(&self, log_id: Uuid, owner_id: Uuid) -> Outcome<bool, CoreError> {
        self.try_delete(log_id, owner_id).await.into()
    }

    async fn try_delete(&self, log_id: Uuid, owner_id: Uuid) -> Result<bool, CoreError> {
        let log = self.get(log_id, owner_id).await.into_result()?;
        Ok(self.store.logs().delete(log.id).await?)
    }
}

fn parse_level(level: &str) -> Result<LogLevel, CoreError> {
    LogLevel::parse(level).ok_or_else(|| {
        CoreError::validation("Invalid log level. Must be: info, debug, warning, error, critical")
    })
}
