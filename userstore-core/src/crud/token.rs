//! Refresh tokens. Every operation is scoped to the owning user.

use super::base::CrudBase;
use crate::config::Settings;
use crate::engine::Engine;
use crate::error::{Result, StoreError};
use crate::models::{RefreshToken, User};
use crate::schemas::{RefreshTokenCreate, RefreshTokenUpdate};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone)]
pub struct TokenCrud {
    base: CrudBase<RefreshToken, RefreshTokenCreate, RefreshTokenUpdate>,
    lifetime_seconds: i64,
}

impl TokenCrud {
    pub fn new(engine: Arc<dyn Engine>, settings: &Settings) -> Self {
        Self {
            base: CrudBase::new(engine, settings.multi_max),
            lifetime_seconds: settings.token_lifetime_seconds(),
        }
    }

    pub fn base(&self) -> &CrudBase<RefreshToken, RefreshTokenCreate, RefreshTokenUpdate> {
        &self.base
    }

    /// Store `token` for `user`. Re-storing a token the user already owns
    /// returns the existing record; a token owned by someone else is refused.
    #[instrument(skip(self, token, user), fields(user_id = %user.id))]
    pub async fn create(&self, token: &str, user: &User) -> Result<RefreshToken> {
        if let Some(existing) = self.base.find_one_by("token", token).await? {
            if existing.authenticates_id != user.id {
                warn!(user_id = %user.id, "refresh token belongs to another user");
                return Err(StoreError::TokenMismatch);
            }
            return Ok(existing);
        }

        let created = self
            .base
            .create(RefreshTokenCreate {
                token: token.to_string(),
                authenticates: user.id,
                lifetime_seconds: self.lifetime_seconds,
            })
            .await?;
        info!(user_id = %user.id, token_id = %created.id, "stored refresh token");
        Ok(created)
    }

    /// The record for `token`, only if `user` owns it.
    #[instrument(skip(self, token, user), fields(user_id = %user.id))]
    pub async fn get(&self, user: &User, token: &str) -> Result<Option<RefreshToken>> {
        Ok(self
            .base
            .find_one_by("token", token)
            .await?
            .filter(|t| t.authenticates_id == user.id))
    }

    pub async fn get_multi_for_user(&self, user: &User) -> Result<Vec<RefreshToken>> {
        self.base
            .find_by("authenticates_id", user.id.to_string())
            .await
    }

    #[instrument(skip(self, db_obj), fields(token_id = %db_obj.id))]
    pub async fn remove(&self, db_obj: &RefreshToken) -> Result<()> {
        self.base.remove(db_obj.id).await?;
        Ok(())
    }

    /// Delete every token expired at `now`; returns how many went.
    #[instrument(skip(self))]
    pub async fn remove_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut removed = 0;
        for token in self.base.get_multi(0, false).await? {
            if token.is_expired(now) && self.base.remove(token.id).await?.is_some() {
                removed += 1;
            }
        }
        if removed > 0 {
            info!(removed, "purged expired refresh tokens");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crud::user::tests::{user_with_password, users};
    use crate::crud::UserCrud;
    use chrono::Duration;

    fn tokens(users: &UserCrud) -> TokenCrud {
        TokenCrud::new(Arc::clone(users.base().engine()), &Settings::default())
    }

    #[tokio::test]
    async fn create_is_idempotent_per_owner() {
        let users = users();
        let tokens = tokens(&users);
        let owner = user_with_password(&users, "a@example.com").await;

        let first = tokens.create("tok-1", &owner).await.unwrap();
        let again = tokens.create("tok-1", &owner).await.unwrap();
        assert_eq!(first, again);
        assert_eq!(tokens.get_multi_for_user(&owner).await.unwrap().len(), 1);
        assert_eq!(
            first.expires - first.created,
            Duration::seconds(Settings::default().token_lifetime_seconds())
        );
    }

    #[tokio::test]
    async fn create_refuses_foreign_token() {
        let users = users();
        let tokens = tokens(&users);
        let owner = user_with_password(&users, "a@example.com").await;
        let other = user_with_password(&users, "b@example.com").await;

        tokens.create("tok-1", &owner).await.unwrap();
        let err = tokens.create("tok-1", &other).await.unwrap_err();
        assert!(matches!(err, StoreError::TokenMismatch));
    }

    #[tokio::test]
    async fn get_is_scoped_to_owner() {
        let users = users();
        let tokens = tokens(&users);
        let owner = user_with_password(&users, "a@example.com").await;
        let other = user_with_password(&users, "b@example.com").await;
        let stored = tokens.create("tok-1", &owner).await.unwrap();

        assert_eq!(tokens.get(&owner, "tok-1").await.unwrap(), Some(stored));
        assert_eq!(tokens.get(&other, "tok-1").await.unwrap(), None);
        assert_eq!(tokens.get(&owner, "tok-2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn removing_token_keeps_user() {
        let users = users();
        let tokens = tokens(&users);
        let owner = user_with_password(&users, "a@example.com").await;
        let stored = tokens.create("tok-1", &owner).await.unwrap();

        tokens.remove(&stored).await.unwrap();
        assert_eq!(tokens.get(&owner, "tok-1").await.unwrap(), None);
        assert!(users.get(owner.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn remove_expired_only_drops_old_tokens() {
        let users = users();
        let tokens = tokens(&users);
        let owner = user_with_password(&users, "a@example.com").await;
        tokens.create("tok-1", &owner).await.unwrap();
        tokens.create("tok-2", &owner).await.unwrap();

        assert_eq!(tokens.remove_expired(Utc::now()).await.unwrap(), 0);

        let lifetime = Settings::default().token_lifetime_seconds();
        let later = Utc::now() + Duration::seconds(lifetime + 60);
        assert_eq!(tokens.remove_expired(later).await.unwrap(), 2);
        assert!(tokens.get_multi_for_user(&owner).await.unwrap().is_empty());
    }
}
