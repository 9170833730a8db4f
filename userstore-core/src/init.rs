//! First-run bootstrap.

use crate::config::Settings;
use crate::crud::UserCrud;
use crate::error::Result;
use crate::models::User;
use crate::schemas::UserCreate;
use tracing::{info, instrument};

/// Create the configured first superuser unless a user with that email
/// already exists. Returns the user when one was created.
#[instrument(skip(users, settings))]
pub async fn init_db(users: &UserCrud, settings: &Settings) -> Result<Option<User>> {
    let Some(email) = settings.first_superuser.as_deref() else {
        info!("no first superuser configured");
        return Ok(None);
    };

    if users.get_by_email(email).await?.is_some() {
        return Ok(None);
    }

    let user_in = UserCreate {
        is_superuser: true,
        full_name: email.to_string(),
        password: settings.first_superuser_password.clone(),
        ..UserCreate::new(email)
    };
    let user = users.create(user_in).await?;
    info!(user_id = %user.id, email = %user.email, "superuser created");
    Ok(Some(user))
}
