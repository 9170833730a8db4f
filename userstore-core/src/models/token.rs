//! Refresh-token document.

use super::now_sec;
use crate::engine::Document;
use crate::schemas::RefreshTokenCreate;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issued refresh token, owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshToken {
    pub id: Uuid,
    pub token: String,
    /// Owning user id
    pub authenticates_id: Uuid,
    pub created: DateTime<Utc>,
    pub expires: DateTime<Utc>,
}

impl RefreshToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires <= now
    }
}

impl Document for RefreshToken {
    const COLLECTION: &'static str = "tokens";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl From<RefreshTokenCreate> for RefreshToken {
    fn from(obj_in: RefreshTokenCreate) -> Self {
        let created = now_sec();
        Self {
            id: Uuid::new_v4(),
            token: obj_in.token,
            authenticates_id: obj_in.authenticates,
            created,
            expires: created + Duration::seconds(obj_in.lifetime_seconds),
        }
    }
}
