//! Group create and update shapes.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use validator::Validate;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserGroupCreate {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl UserGroupCreate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            permissions: Vec::new(),
            is_active: true,
        }
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }
}

/// Partial update; a given `permissions` list replaces the stored one.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UserGroupUpdate {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub permissions: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_defaults_from_json() {
        let parsed: UserGroupCreate = serde_json::from_value(json!({"name": "staff"})).unwrap();
        assert!(parsed.is_active);
        assert!(parsed.permissions.is_empty());
        assert!(parsed.validate().is_ok());
        assert!(UserGroupCreate::new("").validate().is_err());
    }

    #[test]
    fn update_serializes_only_set_fields() {
        let update = UserGroupUpdate {
            is_active: Some(false),
            ..UserGroupUpdate::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"is_active": false}));
    }
}
