//! Email validation flag, verification counter and admin state toggles.

use super::UserCrud;
use crate::crud::base::{Changes, UpdateInput};
use crate::error::Result;
use crate::models::User;
use crate::schemas::UserUpdate;
use serde_json::Value;
use tracing::{info, instrument};

impl UserCrud {
    #[instrument(skip(self, db_obj), fields(user_id = %db_obj.id))]
    pub async fn validate_email(&self, db_obj: User) -> Result<User> {
        let user = self
            .apply(db_obj, Changes::new().set("email_validated", true))
            .await?;
        info!(user_id = %user.id, "email validated");
        Ok(user)
    }

    /// Count one more verification email.
    pub async fn increment_email_verification_counter(&self, db_obj: User) -> Result<User> {
        self.increment_email_verification_counter_by(db_obj, 1).await
    }

    #[instrument(skip(self, db_obj), fields(user_id = %db_obj.id))]
    pub async fn increment_email_verification_counter_by(
        &self,
        db_obj: User,
        inc: u32,
    ) -> Result<User> {
        let count = db_obj.email_tokens_cnt.saturating_add(inc);
        self.apply(db_obj, Changes::new().set("email_tokens_cnt", count))
            .await
    }

    /// Whether another verification email may be sent.
    pub fn can_send_verification_email(&self, user: &User) -> bool {
        user.email_tokens_cnt < self.max_confirmation_emails
    }

    /// Find the user named by the input's email and merge the input into it.
    /// `None` when the input carries no email or nobody has it.
    #[instrument(skip(self, obj_in))]
    pub async fn toggle_user_state(
        &self,
        obj_in: impl Into<UpdateInput<UserUpdate>>,
    ) -> Result<Option<User>> {
        let obj_in = obj_in.into();
        let email = match &obj_in {
            UpdateInput::Schema(update) => update.email.clone(),
            UpdateInput::Fields(changes) => changes
                .get("email")
                .and_then(Value::as_str)
                .map(str::to_string),
        };
        let Some(email) = email else {
            return Ok(None);
        };
        let Some(db_obj) = self.get_by_email(&email).await? else {
            return Ok(None);
        };
        self.update(db_obj, obj_in).await.map(Some)
    }
}
