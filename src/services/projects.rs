//! Project registry and ownership guard.

use uuid::Uuid;

use crate::db::Store;
use crate::domain::{CoreError, Outcome};
use crate::entities::projects;

const MAX_PROJECT_NAME_LEN: usize = 100;

#[derive(Clone)]
pub struct ProjectService {
    store: Store,
}

impl ProjectService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Ownership guard: returns the project only if it exists and belongs to
    /// `user_id`. A missing project and a foreign project produce the same
    /// error, so callers cannot probe for existence. No side effects.
    pub async fn check_access(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Outcome<projects::Model, CoreError> {
        match self.store.projects().find_owned(project_id, user_id).await {
            Ok(Some(project)) => Outcome::Ok(project),
            Ok(None) => Outcome::Err(CoreError::NotFoundOrForbidden),
            Err(e) => Outcome::Err(e.into()),
        }
    }

    pub async fn create(&self, owner_id: Uuid, name: &str) -> Outcome<projects::Model, CoreError> {
        self.try_create(owner_id, name).await.into()
    }

    async fn try_create(&self, owner_id: Uuid, name: &str) -> Result<projects::Model, CoreError> {
        let name = validate_name(name)?;

        if self.store.projects().name_taken(owner_id, name, None).await? {
            return Err(CoreError::conflict(
                "Project name already exists for this user",
            ));
        }

        Ok(self.store.projects().insert(owner_id, name).await?)
    }

    pub async fn rename(
        &self,
        project_id: Uuid,
        owner_id: Uuid,
        new_name: &str,
    ) -> Outcome<projects::Model, CoreError> {
        self.try_rename(project_id, owner_id, new_name).await.into()
    }

    async fn try_rename(
        &self,
        project_id: Uuid,
        owner_id: Uuid,
        new_name: &str,
    ) -> Result<projects::Model, CoreError> {
        let new_name = validate_name(new_name)?;

        let project = self
            .check_access(project_id, owner_id)
            .await
            .into_result()?;

        if project.name != new_name
            && self
                .store
                .projects()
                .name_taken(owner_id, new_name, Some(project_id))
                .await?
        {
            return Err(CoreError::conflict(
                "Project name already exists for this user",
            ));
        }

        Ok(self.store.projects().rename(project, new_name).await?)
    }

    /// Newest-created-first.
    pub async fn list_for_owner(&self, owner_id: Uuid) -> Outcome<Vec<projects::Model>, CoreError> {
        match self.store.projects().list_for_owner(owner_id).await {
            Ok(projects) => Outcome::Ok(projects),
            Err(e) => Outcome::Err(e.into()),
        }
    }

    /// Guard first, then transactional cascade over logs, events, and keys.
    pub async fn delete(&self, project_id: Uuid, owner_id: Uuid) -> Outcome<bool, CoreError> {
        self.try_delete(project_id, owner_id).await.into()
    }

    async fn try_delete(&self, project_id: Uuid, owner_id: Uuid) -> Result<bool, CoreError> {
        self.check_access(project_id, owner_id)
            .await
            .into_result()?;

        Ok(self.store.projects().delete_cascade(project_id).await?)
    }
}

fn validate_name(name: &str) -> Result<&str, CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::validation("Project name cannot be empty"));
    }
    if trimmed.len() > MAX_PROJECT_NAME_LEN {
        return Err(CoreError::validation(
            "Project name must be 100 characters or less",
        ));
    }
    Ok(trimmed)
}
