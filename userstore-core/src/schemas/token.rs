//! Token value objects and refresh-token schemas.
//!
//! Only `RefreshTokenCreate` and `RefreshTokenUpdate` reach the store; the
//! rest are claim carriers for the layer that signs and verifies tokens.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use uuid::Uuid;
use validator::Validate;

/// New refresh token bound to a user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RefreshTokenCreate {
    #[validate(length(min = 1))]
    pub token: String,
    /// Owning user id
    pub authenticates: Uuid,
    /// Seconds until the stored token expires, at most `u32::MAX`
    #[validate(range(min = 1i64, max = 4294967295i64))]
    pub lifetime_seconds: i64,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RefreshTokenUpdate {
    #[validate(length(min = 1))]
    pub token: Option<String>,
    pub authenticates_id: Option<Uuid>,
}

/// Token pair handed to clients.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: String,
}

/// Claims carried by access and refresh tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    #[serde(default)]
    pub sub: Option<Uuid>,
    /// Set on refresh tokens
    #[serde(default)]
    pub refresh: bool,
    /// Set while a TOTP code is still required to finish login
    #[serde(default)]
    pub totp: bool,
}

/// Claims of a one-time magic-link token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MagicTokenPayload {
    #[serde(default)]
    pub sub: Option<String>,
    /// Fingerprint binding the claim to the requesting client
    #[serde(default)]
    pub fingerprint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebToken {
    pub claim: String,
}
