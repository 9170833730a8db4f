//! Credential checks.

use super::UserCrud;
use crate::crud::crypto::{dummy_hash, verify_password};
use crate::error::Result;
use crate::models::User;
use tracing::{info, instrument, warn};

impl UserCrud {
    /// Check an email/password pair.
    ///
    /// Unknown email, user without a password and wrong password all return
    /// `Ok(None)`, and all three run one bcrypt verification, so callers
    /// cannot tell which emails exist.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>> {
        let dummy = self
            .dummy_hash
            .get_or_try_init(|| dummy_hash(self.bcrypt_cost))
            .await?;

        let user = self.get_by_email(email).await?;
        let stored = user
            .as_ref()
            .and_then(|u| u.hashed_password.as_deref())
            .filter(|h| !h.is_empty());
        let has_stored = stored.is_some();
        let verified = verify_password(password, Some(stored.unwrap_or(dummy.as_str()))).await?;

        match user {
            Some(user) if has_stored && verified => {
                info!(user_id = %user.id, "user authenticated");
                Ok(Some(user))
            }
            _ => {
                warn!(email = %email, "authentication failed");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{user_with_password, users};
    use crate::schemas::UserCreate;

    #[tokio::test]
    async fn authenticate_scenario() {
        let users = users();
        let user = user_with_password(&users, "a@example.com").await;

        let found = users
            .authenticate("a@example.com", "longenough1")
            .await
            .unwrap();
        assert_eq!(found, Some(user));

        assert_eq!(users.authenticate("a@example.com", "wrong").await.unwrap(), None);
        assert_eq!(
            users
                .authenticate("missing@example.com", "anything")
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn user_without_password_never_authenticates() {
        let users = users();
        users.create(UserCreate::new("a@example.com")).await.unwrap();

        for attempt in ["", "longenough1", "dummy-password-for-unknown-accounts"] {
            assert_eq!(users.authenticate("a@example.com", attempt).await.unwrap(), None);
        }
    }
}
