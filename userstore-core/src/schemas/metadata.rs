//! Reusable descriptive attributes for entities that mix them in.

use crate::error::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Projection used when writing metadata-bearing entities.
pub trait AsDbDict: Serialize {
    /// Values considered defaults; matching fields are left out.
    fn default_fields() -> Map<String, Value>;

    /// Serialized fields minus nulls and defaults, with `id`/`identifier`
    /// rendered as simple (unhyphenated) hex.
    fn as_db_dict(&self) -> Result<Map<String, Value>> {
        let Value::Object(mut fields) = serde_json::to_value(self)? else {
            return Ok(Map::new());
        };
        let defaults = Self::default_fields();
        fields.retain(|key, value| !value.is_null() && defaults.get(key) != Some(value));

        for key in ["id", "identifier"] {
            let hex = match fields.get(key) {
                Some(Value::String(raw)) => Uuid::parse_str(raw).ok().map(|id| id.simple().to_string()),
                _ => None,
            };
            if let Some(hex) = hex {
                fields.insert(key.to_string(), Value::String(hex));
            }
        }
        Ok(fields)
    }
}

fn flag_defaults() -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("isActive".to_string(), Value::Bool(true));
    map.insert("isPrivate".to_string(), Value::Bool(true));
    map
}

/// Received via API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataBase {
    /// Human-readable title given to the resource
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the resource is still actively maintained
    #[serde(default = "some_true")]
    pub is_active: Option<bool>,
    /// Whether the resource is restricted to authorised team members
    #[serde(default = "some_true")]
    pub is_private: Option<bool>,
}

fn some_true() -> Option<bool> {
    Some(true)
}

impl Default for MetadataBase {
    fn default() -> Self {
        Self {
            title: None,
            description: None,
            is_active: some_true(),
            is_private: some_true(),
        }
    }
}

impl AsDbDict for MetadataBase {
    fn default_fields() -> Map<String, Value> {
        flag_defaults()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataBaseCreate {
    #[serde(flatten)]
    pub base: MetadataBase,
}

impl AsDbDict for MetadataBaseCreate {
    fn default_fields() -> Map<String, Value> {
        flag_defaults()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataBaseUpdate {
    #[serde(flatten)]
    pub base: MetadataBase,
    pub identifier: Uuid,
}

impl AsDbDict for MetadataBaseUpdate {
    fn default_fields() -> Map<String, Value> {
        flag_defaults()
    }
}

/// Stored form: identifier and creation date are managed programmatically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataBaseInDb {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub identifier: Uuid,
    pub created: NaiveDate,
    pub is_active: bool,
    pub is_private: bool,
}

impl AsDbDict for MetadataBaseInDb {
    fn default_fields() -> Map<String, Value> {
        Map::new()
    }
}

/// One page of results with the paging window that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn db_dict_drops_defaults_and_nulls() {
        let meta = MetadataBaseCreate {
            base: MetadataBase {
                title: Some("Notes".into()),
                is_private: Some(false),
                ..MetadataBase::default()
            },
        };
        let dict = meta.as_db_dict().unwrap();
        assert_eq!(dict.get("title"), Some(&json!("Notes")));
        assert_eq!(dict.get("isPrivate"), Some(&json!(false)));
        assert!(!dict.contains_key("isActive"));
        assert!(!dict.contains_key("description"));
    }

    #[test]
    fn db_dict_renders_identifier_as_hex() {
        let identifier = Uuid::new_v4();
        let update = MetadataBaseUpdate {
            base: MetadataBase::default(),
            identifier,
        };
        let dict = update.as_db_dict().unwrap();
        let hex = identifier.simple().to_string();
        assert_eq!(dict.get("identifier"), Some(&json!(hex)));
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn stored_form_keeps_required_flags() {
        let stored = MetadataBaseInDb {
            title: None,
            description: Some("d".into()),
            identifier: Uuid::new_v4(),
            created: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            is_active: true,
            is_private: true,
        };
        let dict = stored.as_db_dict().unwrap();
        assert_eq!(dict.get("isActive"), Some(&json!(true)));
        assert_eq!(dict.get("created"), Some(&json!("2024-01-02")));
        assert!(!dict.contains_key("title"));
    }
}
