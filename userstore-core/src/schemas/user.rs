//! User request and response shapes.

use crate::models::User;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use uuid::Uuid;
use validator::Validate;

fn default_true() -> bool {
    true
}

/// Canonical stored form of an address: the domain is lowercased, the local
/// part is kept as given.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Login form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserLogin {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Admin-side user creation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserCreate {
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub email_validated: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub full_name: String,
    /// Optional; users created without one cannot log in with a password
    #[validate(length(min = 8, max = 64))]
    #[serde(default)]
    pub password: Option<String>,
}

impl UserCreate {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            email_validated: false,
            is_active: true,
            is_superuser: false,
            full_name: String::new(),
            password: None,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

/// Self-service sign-up.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserCreatePublic {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 64))]
    pub password: String,
    #[serde(default)]
    pub full_name: String,
}

impl From<UserCreatePublic> for UserCreate {
    fn from(public: UserCreatePublic) -> Self {
        Self {
            full_name: public.full_name,
            ..UserCreate::new(public.email).with_password(public.password)
        }
    }
}

/// Partial update. Unset fields are not serialized, so they never overwrite
/// stored values.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UserUpdate {
    #[validate(email)]
    pub email: Option<String>,
    pub email_validated: Option<bool>,
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
    pub full_name: Option<String>,
    /// Current password, when the caller must prove it
    #[validate(length(min = 8, max = 64))]
    pub original: Option<String>,
    #[validate(length(min = 8, max = 64))]
    pub password: Option<String>,
}

/// Password reset through an emailed claim.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserUpdatePassword {
    pub claim: String,
    #[validate(length(min = 8, max = 64))]
    pub new_password: String,
}

/// API-facing user: secrets are reduced to presence flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPublic {
    pub id: Uuid,
    pub email: String,
    pub email_validated: bool,
    pub is_active: bool,
    pub is_superuser: bool,
    pub full_name: String,
    /// Whether a password is set
    pub password: bool,
    /// Whether TOTP is enabled
    pub totp: bool,
}

impl From<&User> for UserPublic {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            email_validated: user.email_validated,
            is_active: user.is_active,
            is_superuser: user.is_superuser,
            full_name: user.full_name.clone(),
            password: user.hashed_password.as_deref().is_some_and(|h| !h.is_empty()),
            totp: user.totp_secret.as_deref().is_some_and(|s| !s.is_empty()),
        }
    }
}

impl From<User> for UserPublic {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_rejects_bad_email_and_short_password() {
        assert!(UserCreate::new("not-an-email").validate().is_err());
        assert!(UserCreate::new("a@example.com")
            .with_password("short")
            .validate()
            .is_err());
        assert!(UserCreate::new("a@example.com")
            .with_password("x".repeat(65))
            .validate()
            .is_err());
        assert!(UserCreate::new("a@example.com")
            .with_password("longenough1")
            .validate()
            .is_ok());
        assert!(UserCreate::new("a@example.com").validate().is_ok());
    }

    #[test]
    fn normalize_lowercases_domain_only() {
        assert_eq!(normalize_email(" Ada@Example.COM "), "Ada@example.com");
        assert_eq!(normalize_email("a@b@Host.org"), "a@b@host.org");
        assert_eq!(normalize_email("no-at-sign"), "no-at-sign");
    }

    #[test]
    fn create_defaults_from_json() {
        let parsed: UserCreate = serde_json::from_value(json!({"email": "a@example.com"})).unwrap();
        assert!(parsed.is_active);
        assert!(!parsed.is_superuser);
        assert!(!parsed.email_validated);
        assert_eq!(parsed.full_name, "");
        assert!(parsed.password.is_none());
    }

    #[test]
    fn update_serializes_only_set_fields() {
        let update = UserUpdate {
            full_name: Some("Ada".into()),
            ..UserUpdate::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"full_name": "Ada"}));
    }

    #[test]
    fn public_view_hides_secrets() {
        let mut user = User::from(UserCreate::new("a@example.com"));
        user.hashed_password = Some("$2b$04$hash".into());
        let public = UserPublic::from(&user);
        assert!(public.password);
        assert!(!public.totp);

        let value = serde_json::to_value(&public).unwrap();
        assert_eq!(value["password"], json!(true));
        assert!(value.get("hashed_password").is_none());
        assert!(value.get("totp_secret").is_none());
    }

    #[test]
    fn public_signup_maps_to_create() {
        let create = UserCreate::from(UserCreatePublic {
            email: "a@example.com".into(),
            password: "longenough1".into(),
            full_name: "Ada".into(),
        });
        assert_eq!(create.password.as_deref(), Some("longenough1"));
        assert_eq!(create.full_name, "Ada");
        assert!(create.is_active);
        assert!(!create.is_superuser);
    }
}
