//! Document database handle.
//!
//! Every read and write of the crate goes through an [`Engine`]: a store of
//! JSON documents grouped in named collections and keyed by UUID. Documents
//! come back in insertion order. The handle is built once at startup and
//! shared as `Arc<dyn Engine>`; it is never mutated after construction.

mod file;
mod memory;

pub use file::FileEngine;
pub use memory::MemoryEngine;

use crate::error::{Result, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Debug;
use uuid::Uuid;

/// A window into a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: u64,
    pub limit: u64,
}

impl Page {
    /// The `page`-th window of `size` documents.
    pub fn nth(page: u64, size: u64) -> Self {
        Self {
            skip: page.saturating_mul(size),
            limit: size,
        }
    }
}

/// Storage backend for JSON documents.
#[async_trait::async_trait]
pub trait Engine: Send + Sync + Debug {
    /// Fetch one document by id.
    async fn find_one(&self, collection: &str, id: &Uuid) -> Result<Option<Value>>;

    /// All documents whose top-level `field` equals `value`, or, for array
    /// fields, contains it.
    async fn find_by(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<Value>>;

    /// Documents of a collection; `None` returns the whole collection.
    async fn find(&self, collection: &str, page: Option<Page>) -> Result<Vec<Value>>;

    /// Insert or replace a document. Replacing keeps the insertion position.
    async fn save(&self, collection: &str, id: &Uuid, doc: Value) -> Result<()>;

    /// Delete a document; returns whether it existed.
    async fn delete(&self, collection: &str, id: &Uuid) -> Result<bool>;
}

/// A typed document stored in a single collection.
pub trait Document: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: &'static str;

    fn id(&self) -> Uuid;

    fn to_document(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn from_document(doc: Value) -> Result<Self> {
        serde_json::from_value(doc).map_err(|e| StoreError::InvalidDocument {
            collection: Self::COLLECTION.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Top-level field equality, shared by the engine implementations. An array
/// field also matches a scalar it contains.
pub(crate) fn field_matches(doc: &Value, field: &str, value: &Value) -> bool {
    match doc.get(field) {
        Some(Value::Array(items)) if !value.is_array() => items.contains(value),
        Some(v) => v == value,
        None => false,
    }
}

pub(crate) fn window<T>(docs: impl Iterator<Item = T>, page: Option<Page>) -> Vec<T> {
    match page {
        Some(p) => docs.skip(p.skip as usize).take(p.limit as usize).collect(),
        None => docs.collect(),
    }
}
