//! User CRUD: the generic base plus password hashing, authentication, TOTP
//! and email-validation bookkeeping.

mod auth;
mod email;
mod totp;

use super::base::{Changes, CrudBase, UpdateInput};
use super::crypto::hash_password;
use crate::config::Settings;
use crate::engine::Engine;
use crate::error::{Result, StoreError};
use crate::models::{now_sec, User};
use crate::schemas::{normalize_email, UserCreate, UserUpdate};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

impl From<UserUpdate> for UpdateInput<UserUpdate> {
    fn from(obj_in: UserUpdate) -> Self {
        Self::Schema(obj_in)
    }
}

#[derive(Debug, Clone)]
pub struct UserCrud {
    base: CrudBase<User, UserCreate, UserUpdate>,
    bcrypt_cost: u32,
    totp_issuer: String,
    max_confirmation_emails: u32,
    /// Lazily computed hash verified against for unknown accounts
    dummy_hash: Arc<OnceCell<String>>,
}

// ============================================================================
// Construction
// ============================================================================

impl UserCrud {
    pub fn new(engine: Arc<dyn Engine>, settings: &Settings) -> Self {
        Self {
            base: CrudBase::new(engine, settings.multi_max),
            bcrypt_cost: settings.bcrypt_cost,
            totp_issuer: settings.totp_issuer.clone(),
            max_confirmation_emails: settings.emails_user_confirmation_max_emails,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    pub fn base(&self) -> &CrudBase<User, UserCreate, UserUpdate> {
        &self.base
    }

    /// Stamp `modified`, merge and persist.
    pub(super) async fn apply(&self, db_obj: User, mut changes: Changes) -> Result<User> {
        changes.insert("modified", serde_json::to_value(now_sec())?);
        self.base.apply(db_obj, &changes).await
    }
}

// ============================================================================
// CRUD
// ============================================================================

impl UserCrud {
    pub async fn get(&self, id: Uuid) -> Result<Option<User>> {
        self.base.get(id).await
    }

    pub async fn get_multi(&self, page: u64, page_break: bool) -> Result<Vec<User>> {
        self.base.get_multi(page, page_break).await
    }

    #[instrument(skip(self))]
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        self.base.find_one_by("email", normalize_email(email)).await
    }

    /// Create a user, hashing the password when one is given. Without one the
    /// stored hash stays unset.
    #[instrument(skip(self, obj_in), fields(email = %obj_in.email))]
    pub async fn create(&self, mut obj_in: UserCreate) -> Result<User> {
        obj_in.validate()?;
        obj_in.email = normalize_email(&obj_in.email);

        if self.get_by_email(&obj_in.email).await?.is_some() {
            return Err(StoreError::AlreadyExists(format!("email: {}", obj_in.email)));
        }

        let hashed_password = match obj_in.password.take() {
            Some(password) => Some(hash_password(&password, self.bcrypt_cost).await?),
            None => None,
        };

        let mut user = User::from(obj_in);
        user.hashed_password = hashed_password;
        let user = self.base.insert(user).await?;

        info!(user_id = %user.id, email = %user.email, "created user");
        Ok(user)
    }

    /// Merge-update. A new password is hashed and its plaintext dropped; a
    /// changed email must not belong to another user and clears
    /// `email_validated`.
    #[instrument(skip(self, db_obj, obj_in), fields(user_id = %db_obj.id))]
    pub async fn update(
        &self,
        db_obj: User,
        obj_in: impl Into<UpdateInput<UserUpdate>>,
    ) -> Result<User> {
        let mut changes = obj_in.into().into_changes()?;
        changes.remove("original");

        let new_email = match changes.get("email") {
            Some(Value::String(email)) => Some(normalize_email(email)),
            _ => None,
        };
        if let Some(email) = new_email {
            if email != db_obj.email {
                if let Some(holder) = self.get_by_email(&email).await? {
                    if holder.id != db_obj.id {
                        return Err(StoreError::AlreadyExists(format!("email: {}", email)));
                    }
                }
                changes.insert("email_validated", false);
            }
            changes.insert("email", email);
        }

        if let Some(Value::String(password)) = changes.remove("password") {
            if !password.is_empty() {
                let hashed = hash_password(&password, self.bcrypt_cost).await?;
                changes.insert("hashed_password", hashed);
            }
        }

        let user = self.apply(db_obj, changes).await?;
        info!(user_id = %user.id, "updated user");
        Ok(user)
    }

    pub async fn remove(&self, id: Uuid) -> Result<Option<User>> {
        let removed = self.base.remove(id).await?;
        if removed.is_some() {
            info!(user_id = %id, "removed user");
        }
        Ok(removed)
    }
}

// ============================================================================
// Predicates
// ============================================================================

impl UserCrud {
    pub fn has_password(&self, user: &User) -> bool {
        user.hashed_password.as_deref().is_some_and(|h| !h.is_empty())
    }

    pub fn is_active(&self, user: &User) -> bool {
        user.is_active
    }

    pub fn is_superuser(&self, user: &User) -> bool {
        user.is_superuser
    }

    pub fn is_email_validated(&self, user: &User) -> bool {
        user.email_validated
    }
}
