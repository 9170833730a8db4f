//! Runtime settings, read from `US_*` environment variables.

use std::env;
use std::path::PathBuf;
use tracing::info;

const DEFAULT_MULTI_MAX: u64 = 20;
const DEFAULT_ACCESS_TOKEN_EXPIRE_SECONDS: i64 = 60 * 30;
const DEFAULT_REFRESH_TOKEN_EXPIRE_SECONDS: i64 = 60 * 60 * 24 * 30;
const DEFAULT_MAX_CONFIRMATION_EMAILS: u32 = 3;

/// Cheapest work factor bcrypt accepts; used by tests.
pub const BCRYPT_MIN_COST: u32 = 4;
pub const BCRYPT_MAX_COST: u32 = 31;

/// Upper bound for token ttls, keeps expiry arithmetic in range.
pub const MAX_TOKEN_TTL_SECONDS: i64 = u32::MAX as i64;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Root directory of the file-backed document store
    pub data_dir: PathBuf,
    /// Page size used by `get_multi` when paging is requested
    pub multi_max: u64,
    /// bcrypt work factor
    pub bcrypt_cost: u32,
    pub access_token_expire_seconds: i64,
    pub refresh_token_expire_seconds: i64,
    /// Issuer label embedded in `otpauth://` URIs
    pub totp_issuer: String,
    pub first_superuser: Option<String>,
    pub first_superuser_password: Option<String>,
    pub emails_user_confirmation_max_emails: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            multi_max: DEFAULT_MULTI_MAX,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            access_token_expire_seconds: DEFAULT_ACCESS_TOKEN_EXPIRE_SECONDS,
            refresh_token_expire_seconds: DEFAULT_REFRESH_TOKEN_EXPIRE_SECONDS,
            totp_issuer: "userstore".to_string(),
            first_superuser: None,
            first_superuser_password: None,
            emails_user_confirmation_max_emails: DEFAULT_MAX_CONFIRMATION_EMAILS,
        }
    }
}

impl Settings {
    /// Build settings from the environment; unparseable values fall back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let data_dir = env::var("US_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let multi_max = parsed("US_MULTI_MAX")
            .filter(|n: &u64| *n > 0)
            .unwrap_or(defaults.multi_max);

        let bcrypt_cost = parsed("US_BCRYPT_COST")
            .filter(|c: &u32| (BCRYPT_MIN_COST..=BCRYPT_MAX_COST).contains(c))
            .unwrap_or(defaults.bcrypt_cost);

        let access_token_expire_seconds = parsed("US_ACCESS_TOKEN_EXPIRE_SECONDS")
            .map(clamp_ttl)
            .unwrap_or(defaults.access_token_expire_seconds);
        let refresh_token_expire_seconds = parsed("US_REFRESH_TOKEN_EXPIRE_SECONDS")
            .map(clamp_ttl)
            .unwrap_or(defaults.refresh_token_expire_seconds);

        let totp_issuer = non_empty("US_TOTP_ISSUER").unwrap_or(defaults.totp_issuer);

        let first_superuser = non_empty("US_FIRST_SUPERUSER");
        let first_superuser_password = non_empty("US_FIRST_SUPERUSER_PASSWORD");
        if first_superuser.is_some() && first_superuser_password.is_none() {
            info!("US_FIRST_SUPERUSER set without a password; superuser will have no password");
        }

        let emails_user_confirmation_max_emails =
            parsed("US_EMAILS_USER_CONFIRMATION_MAX_EMAILS")
                .unwrap_or(defaults.emails_user_confirmation_max_emails);

        Self {
            data_dir,
            multi_max,
            bcrypt_cost,
            access_token_expire_seconds,
            refresh_token_expire_seconds,
            totp_issuer,
            first_superuser,
            first_superuser_password,
            emails_user_confirmation_max_emails,
        }
    }

    /// Lifetime of a stored refresh token: the longer of the two token ttls.
    pub fn token_lifetime_seconds(&self) -> i64 {
        self.access_token_expire_seconds
            .max(self.refresh_token_expire_seconds)
    }
}

fn clamp_ttl(seconds: i64) -> i64 {
    seconds.clamp(1, MAX_TOKEN_TTL_SECONDS)
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
