//! Session authenticator: signup, credential verification, and bearer
//! tokens.
//!
//! `authenticate` answers through [`Maybe`] so that unknown emails and wrong
//! passwords are indistinguishable to the caller; `resolve_token` collapses
//! every verification failure into [`CoreError::Unauthorized`].

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tokio::task;
use tracing::warn;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::db::Store;
use crate::db::repositories::user::{hash_password, verify_password};
use crate::domain::{CoreError, Maybe, Outcome};
use crate::entities::users;

const MIN_PASSWORD_LEN: usize = 8;
const MAX_EMAIL_LEN: usize = 255;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    iat: i64,
    exp: i64,
}

#[derive(Clone)]
pub struct AuthService {
    store: Store,
    security: SecurityConfig,
}

impl AuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Outcome<users::Model, CoreError> {
        self.try_signup(email, password, display_name).await.into()
    }

    async fn try_signup(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<users::Model, CoreError> {
        let email = email.trim().to_ascii_lowercase();

        if email.is_empty() || email.len() > MAX_EMAIL_LEN || !email.contains('@') {
            return Err(CoreError::validation("A valid email address is required"));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(CoreError::validation(
                "Password must be at least 8 characters",
            ));
        }
        if display_name.trim().is_empty() {
            return Err(CoreError::validation("Display name is required"));
        }

        if self.store.users().find_by_email(&email).await?.is_some() {
            return Err(CoreError::conflict("Email already registered"));
        }

        let password = password.to_string();
        let security = self.security.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, &security))
            .await
            .map_err(|e| CoreError::internal(format!("Password hashing task panicked: {e}")))??;

        let user = self
            .store
            .users()
            .insert(&email, &password_hash, display_name.trim())
            .await?;

        Ok(user)
    }

    /// Verifies credentials and bumps the last-login timestamp. Unknown
    /// email, wrong password, and store faults all come back as `Nothing`;
    /// faults are additionally logged here since the return carries no error.
    pub async fn authenticate(&self, email: &str, password: &str) -> Maybe<users::Model> {
        let email = email.trim().to_ascii_lowercase();

        let user = match self.store.users().find_by_email(&email).await {
            Ok(Some(user)) => user,
            Ok(None) => return Maybe::Nothing,
            Err(e) => {
                warn!("Credential lookup failed: {e}");
                return Maybe::Nothing;
            }
        };

        let password = password.to_string();
        let stored_hash = user.password_hash.clone();
        let verified =
            task::spawn_blocking(move || verify_password(&password, &stored_hash)).await;

        match verified {
            Ok(Ok(true)) => {}
            Ok(Ok(false)) => return Maybe::Nothing,
            Ok(Err(e)) => {
                warn!("Password verification failed: {e}");
                return Maybe::Nothing;
            }
            Err(e) => {
                warn!("Password verification task panicked: {e}");
                return Maybe::Nothing;
            }
        }

        match self.store.users().touch_last_login(user.clone()).await {
            Ok(updated) => Maybe::Some(updated),
            Err(e) => {
                warn!("Failed to update last login: {e}");
                Maybe::Some(user)
            }
        }
    }

    /// Signs a short-lived HS256 token carrying the user identity.
    pub fn issue_token(&self, user: &users::Model) -> Outcome<String, CoreError> {
        let now = chrono::Utc::now();
        let exp = now + chrono::Duration::minutes(self.security.token_ttl_minutes);

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.security.token_secret.as_bytes()),
        )
        .map_or_else(
            |e| Outcome::Err(CoreError::internal(format!("Token encode failed: {e}"))),
            Outcome::Ok,
        )
    }

    /// Verifies signature and expiry and resolves the subject. Expired,
    /// malformed, badly signed, and unknown-subject tokens are all the same
    /// `Unauthorized` to the caller.
    pub async fn resolve_token(&self, token: &str) -> Outcome<users::Model, CoreError> {
        self.try_resolve_token(token).await.into()
    }

    async fn try_resolve_token(&self, token: &str) -> Result<users::Model, CoreError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.security.token_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| CoreError::Unauthorized)?;

        let user_id = Uuid::parse_str(&data.claims.sub).map_err(|_| CoreError::Unauthorized)?;

        self.store
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or(CoreError::Unauthorized)
    }

    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Outcome<(), CoreError> {
        self.try_change_password(user_id, current_password, new_password)
            .await
            .into()
    }

    async fn try_change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), CoreError> {
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(CoreError::validation(
                "New password must be at least 8 characters",
            ));
        }
        if current_password == new_password {
            return Err(CoreError::validation(
                "New password must be different from current password",
            ));
        }

        let user = self
            .store
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or(CoreError::Unauthorized)?;

        let current = current_password.to_string();
        let stored_hash = user.password_hash.clone();
        let is_valid = task::spawn_blocking(move || verify_password(&current, &stored_hash))
            .await
            .map_err(|e| CoreError::internal(format!("Verification task panicked: {e}")))??;

        if !is_valid {
            return Err(CoreError::validation("Current password is incorrect"));
        }

        let new = new_password.to_string();
        let security = self.security.clone();
        let new_hash = task::spawn_blocking(move || hash_password(&new, &security))
            .await
            .map_err(|e| CoreError::internal(format!("Password hashing task panicked: {e}")))??;

        self.store.users().update_password(user.id, &new_hash).await?;

        Ok(())
    }
}
