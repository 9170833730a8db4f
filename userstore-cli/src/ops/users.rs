//! User administration against the local document store.

use super::ui::{
    print_empty, print_flag, print_header, print_kv, print_success, print_table_header,
    print_table_row, print_warning, yes_no,
};
use super::{print_output, OutputFormat};
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;
use userstore_core::schemas::{UserCreate, UserPublic, UserUpdate};
use userstore_core::{init_db, FileEngine, Settings, TokenCrud, User, UserCrud};

/// CRUD handles sharing one file-backed engine.
pub struct Store {
    pub settings: Settings,
    pub users: UserCrud,
    pub tokens: TokenCrud,
}

impl Store {
    pub fn open(settings: Settings) -> Self {
        let engine = Arc::new(FileEngine::new(&settings.data_dir));
        Self {
            users: UserCrud::new(engine.clone(), &settings),
            tokens: TokenCrud::new(engine, &settings),
            settings,
        }
    }

    async fn require_user(&self, email: &str) -> anyhow::Result<User> {
        self.users
            .get_by_email(email)
            .await?
            .with_context(|| format!("no user with email {}", email))
    }
}

fn print_user(user: &UserPublic, output: OutputFormat) -> anyhow::Result<()> {
    match output {
        OutputFormat::Json => print_output(user)?,
        OutputFormat::Table => {
            print_header(&user.email);
            print_kv("ID", &user.id.to_string());
            print_kv("Full name", &user.full_name);
            print_flag("Active", user.is_active);
            print_flag("Superuser", user.is_superuser);
            print_flag("Email validated", user.email_validated);
            print_flag("Password", user.password);
            print_flag("TOTP", user.totp);
            println!();
        }
    }
    Ok(())
}

/// Create the configured first superuser if missing.
pub async fn init_superuser(store: &Store, output: OutputFormat) -> anyhow::Result<()> {
    let created = init_db(&store.users, &store.settings).await?;
    match (created, output) {
        (Some(user), _) => print_user(&UserPublic::from(user), output)?,
        (None, OutputFormat::Json) => print_output(&serde_json::Value::Null)?,
        (None, OutputFormat::Table) => match &store.settings.first_superuser {
            Some(email) => print_success(&format!("{} already exists", email)),
            None => print_warning("US_FIRST_SUPERUSER is not set, nothing to do"),
        },
    }
    Ok(())
}

pub async fn list_users(
    store: &Store,
    page: u64,
    all: bool,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let users: Vec<UserPublic> = store
        .users
        .get_multi(page, !all)
        .await?
        .iter()
        .map(UserPublic::from)
        .collect();

    if output == OutputFormat::Json {
        return print_output(&users);
    }

    print_header("Users");
    if users.is_empty() {
        print_empty("no users");
        return Ok(());
    }
    let columns = [("ID", 36), ("EMAIL", 32), ("ACTIVE", 6), ("ADMIN", 5), ("TOTP", 4)];
    print_table_header(&columns);
    for user in &users {
        let id = user.id.to_string();
        print_table_row(&[
            (id.as_str(), 36),
            (user.email.as_str(), 32),
            (yes_no(user.is_active), 6),
            (yes_no(user.is_superuser), 5),
            (yes_no(user.totp), 4),
        ]);
    }
    println!();
    Ok(())
}

pub async fn show_user(store: &Store, email: &str, output: OutputFormat) -> anyhow::Result<()> {
    let user = store.require_user(email).await?;
    print_user(&UserPublic::from(user), output)
}

pub async fn create_user(
    store: &Store,
    user_in: UserCreate,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let user = store.users.create(user_in).await?;
    print_user(&UserPublic::from(user), output)
}

/// Enable or disable the account named by `email`.
pub async fn set_active(
    store: &Store,
    email: &str,
    active: bool,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let toggled = store
        .users
        .toggle_user_state(UserUpdate {
            email: Some(email.to_string()),
            is_active: Some(active),
            ..UserUpdate::default()
        })
        .await?
        .with_context(|| format!("no user with email {}", email))?;
    print_user(&UserPublic::from(toggled), output)
}

pub async fn validate_email(store: &Store, email: &str, output: OutputFormat) -> anyhow::Result<()> {
    let user = store.require_user(email).await?;
    let user = store.users.validate_email(user).await?;
    print_user(&UserPublic::from(user), output)
}

/// Delete refresh tokens that have expired by now.
pub async fn purge_tokens(store: &Store, output: OutputFormat) -> anyhow::Result<()> {
    let removed = store.tokens.remove_expired(Utc::now()).await?;
    match output {
        OutputFormat::Json => print_output(&serde_json::json!({ "removed": removed })),
        OutputFormat::Table => {
            print_success(&format!("removed {} expired refresh token(s)", removed));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> Store {
        Store::open(Settings {
            data_dir: dir.path().to_path_buf(),
            bcrypt_cost: 4,
            first_superuser: Some("admin@example.com".into()),
            ..Settings::default()
        })
    }

    #[tokio::test]
    async fn init_then_disable() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        init_superuser(&store, OutputFormat::Json).await.unwrap();
        set_active(&store, "admin@example.com", false, OutputFormat::Json)
            .await
            .unwrap();

        let reopened = self::store(&dir);
        let user = reopened.require_user("admin@example.com").await.unwrap();
        assert!(user.is_superuser);
        assert!(!user.is_active);
    }

    #[tokio::test]
    async fn unknown_email_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert!(show_user(&store, "nobody@example.com", OutputFormat::Json)
            .await
            .is_err());
        assert!(set_active(&store, "nobody@example.com", true, OutputFormat::Json)
            .await
            .is_err());
    }
}
