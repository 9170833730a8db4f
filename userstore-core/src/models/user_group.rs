//! Named permission sets that users can be placed into.

use crate::engine::Document;
use crate::schemas::UserGroupCreate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored group. `name` is unique across the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserGroup {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Permission strings granted to members
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub is_active: bool,
}

impl UserGroup {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

impl Document for UserGroup {
    const COLLECTION: &'static str = "user_groups";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl From<UserGroupCreate> for UserGroup {
    fn from(obj_in: UserGroupCreate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: obj_in.name,
            description: obj_in.description,
            permissions: obj_in.permissions,
            is_active: obj_in.is_active,
        }
    }
}
