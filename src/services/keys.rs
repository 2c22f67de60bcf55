//! Credential manager: generation, masking, rotation, and authentication of
//! per-project API keys.
//!
//! The plaintext secret leaves this module exactly once, in the return value
//! of `create`/`rotate`. Only the SHA-256 digest and the masked display form
//! are ever persisted.

use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::warn;
use uuid::Uuid;

use crate::db::Store;
use crate::domain::{CoreError, Maybe, Outcome};
use crate::entities::api_keys;

pub const API_KEY_PREFIX: &str = "sk_proj_";
const API_KEY_LENGTH: usize = 32;
const MASK_BOUNDARY: usize = 4;

/// Produces a fresh secret: the full plaintext, its lowercase hex SHA-256
/// digest, and the masked display form.
#[must_use]
pub fn generate() -> (String, String, String) {
    let random_part: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(API_KEY_LENGTH)
        .map(char::from)
        .collect();

    let full_key = format!("{API_KEY_PREFIX}{random_part}");
    let key_hash = hash_key(&full_key);
    let masked_key = mask_key(&full_key);

    (full_key, key_hash, masked_key)
}

#[must_use]
pub fn hash_key(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}

/// Prefix plus the first and last few characters; everything else becomes
/// asterisks.
#[must_use]
pub fn mask_key(full_key: &str) -> String {
    let prefix_len = API_KEY_PREFIX.len();
    if full_key.len() < prefix_len + 2 * MASK_BOUNDARY {
        return full_key.to_string();
    }

    let prefix = &full_key[..prefix_len];
    let first = &full_key[prefix_len..prefix_len + MASK_BOUNDARY];
    let last = &full_key[full_key.len() - MASK_BOUNDARY..];
    let masked = "*".repeat(full_key.len() - prefix_len - 2 * MASK_BOUNDARY);

    format!("{prefix}{first}{masked}{last}")
}

/// Constant-time equality over hex digests, so hash comparison cannot be
/// used as a timing oracle.
#[must_use]
pub fn digests_match(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[derive(Clone)]
pub struct ApiKeyService {
    store: Store,
}

impl ApiKeyService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Issues a new key for the project, deactivating any existing one in
    /// the same unit of work. Returns the stored row and the plaintext —
    /// the only time the plaintext is available.
    pub async fn create(
        &self,
        project_id: Uuid,
    ) -> Outcome<(api_keys::Model, String), CoreError> {
        self.try_create(project_id).await.into()
    }

    async fn try_create(
        &self,
        project_id: Uuid,
    ) -> Result<(api_keys::Model, String), CoreError> {
        if self
            .store
            .projects()
            .find_by_id(project_id)
            .await?
            .is_none()
        {
            return Err(CoreError::NotFoundOrForbidden);
        }

        let (full_key, key_hash, masked_key) = generate();

        let stored = self
            .store
            .api_keys()
            .rotate(project_id, &key_hash, &masked_key)
            .await?;

        Ok((stored, full_key))
    }

    /// Caller-facing "reset": the same deactivate-then-create unit of work.
    /// The old plaintext is gone for good.
    pub async fn rotate(
        &self,
        project_id: Uuid,
    ) -> Outcome<(api_keys::Model, String), CoreError> {
        self.create(project_id).await
    }

    /// Idempotent: `false` (not an error) when the project has no active key.
    pub async fn deactivate(&self, project_id: Uuid) -> Outcome<bool, CoreError> {
        match self.store.api_keys().deactivate_active(project_id).await {
            Ok(rows) => Outcome::Ok(rows > 0),
            Err(e) => Outcome::Err(e.into()),
        }
    }

    /// Metadata of the currently active key; never the plaintext.
    pub async fn lookup_by_project(&self, project_id: Uuid) -> Maybe<api_keys::Model> {
        match self.store.api_keys().active_for_project(project_id).await {
            Ok(found) => Maybe::from(found),
            Err(e) => {
                warn!("Active key lookup failed: {e}");
                Maybe::Nothing
            }
        }
    }

    /// Resolves a presented secret to its active key, touching the usage
    /// timestamp. Unknown, inactive, and mismatched keys are all `Nothing`;
    /// callers must not distinguish them.
    pub async fn authenticate(&self, presented_secret: &str) -> Maybe<api_keys::Model> {
        let presented_hash = hash_key(presented_secret);

        let key = match self
            .store
            .api_keys()
            .find_active_by_hash(&presented_hash)
            .await
        {
            Ok(Some(key)) => key,
            Ok(None) => return Maybe::Nothing,
            Err(e) => {
                warn!("Key lookup failed: {e}");
                return Maybe::Nothing;
            }
        };

        if !digests_match(&presented_hash, &key.key_hash) {
            return Maybe::Nothing;
        }

        match self.store.api_keys().touch_last_used(key.clone()).await {
            Ok(updated) => Maybe::Some(updated),
            Err(e) => {
                warn!("Failed to update key usage timestamp: {e}");
                Maybe::Some(key)
            }
        }
    }
}
