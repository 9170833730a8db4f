//! In-process engine, used as a substitute handle in tests.

use super::{field_matches, window, Engine, Page};
use crate::error::Result;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::instrument;
use uuid::Uuid;

/// Documents per collection, kept in insertion order.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    collections: RwLock<HashMap<String, Vec<(Uuid, Value)>>>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Engine for MemoryEngine {
    async fn find_one(&self, collection: &str, id: &Uuid) -> Result<Option<Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|(doc_id, _)| doc_id == id))
            .map(|(_, doc)| doc.clone()))
    }

    async fn find_by(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, doc)| field_matches(doc, field, value))
                    .map(|(_, doc)| doc.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find(&self, collection: &str, page: Option<Page>) -> Result<Vec<Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| window(docs.iter().map(|(_, doc)| doc.clone()), page))
            .unwrap_or_default())
    }

    #[instrument(skip(self, doc))]
    async fn save(&self, collection: &str, id: &Uuid, doc: Value) -> Result<()> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        match docs.iter_mut().find(|(doc_id, _)| doc_id == id) {
            Some(slot) => slot.1 = doc,
            None => docs.push((*id, doc)),
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, collection: &str, id: &Uuid) -> Result<bool> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|(doc_id, _)| doc_id != id);
        Ok(docs.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn save_replaces_in_place() {
        let engine = MemoryEngine::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        engine.save("c", &a, json!({"n": 1})).await.unwrap();
        engine.save("c", &b, json!({"n": 2})).await.unwrap();
        engine.save("c", &a, json!({"n": 3})).await.unwrap();

        let all = engine.find("c", None).await.unwrap();
        assert_eq!(all, vec![json!({"n": 3}), json!({"n": 2})]);
    }

    #[tokio::test]
    async fn delete_reports_presence() {
        let engine = MemoryEngine::new();
        let id = Uuid::new_v4();
        assert!(!engine.delete("c", &id).await.unwrap());
        engine.save("c", &id, json!({})).await.unwrap();
        assert!(engine.delete("c", &id).await.unwrap());
        assert!(engine.find_one("c", &id).await.unwrap().is_none());
    }
}
