//! User account document.
//!
//! The stored form carries the bcrypt hash, TOTP secret and replay counter.
//! Callers outside the crate should hand out `schemas::UserPublic` instead.

use super::now_sec;
use crate::engine::Document;
use crate::schemas::UserCreate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User account as stored (includes secrets; never returned to API callers as-is).
///
/// Every field is serialized, nulls included, so merge-updates can tell which
/// keys belong to the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Assigned on creation, never rewritten
    pub id: Uuid,
    pub created: DateTime<Utc>,
    /// Refreshed on every update through `UserCrud`
    pub modified: DateTime<Utc>,
    #[serde(default)]
    pub full_name: String,
    /// Unique; stored with a lowercased domain
    pub email: String,
    /// bcrypt hash; `None` means no password was ever set
    #[serde(default)]
    pub hashed_password: Option<String>,
    #[serde(default)]
    pub totp_secret: Option<String>,
    /// Last accepted TOTP time step, for replay protection
    #[serde(default)]
    pub totp_counter: Option<u64>,
    #[serde(default)]
    pub email_validated: bool,
    /// Verification emails sent so far
    #[serde(default)]
    pub email_tokens_cnt: u32,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

impl Document for User {
    const COLLECTION: &'static str = "user";

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Maps the schema onto a fresh document. The plaintext password is dropped;
/// hashing is the caller's job.
impl From<UserCreate> for User {
    fn from(obj_in: UserCreate) -> Self {
        let now = now_sec();
        Self {
            id: Uuid::new_v4(),
            created: now,
            modified: now,
            full_name: obj_in.full_name,
            email: obj_in.email,
            hashed_password: None,
            totp_secret: None,
            totp_counter: None,
            email_validated: obj_in.email_validated,
            email_tokens_cnt: 0,
            is_active: obj_in.is_active,
            is_superuser: obj_in.is_superuser,
        }
    }
}
