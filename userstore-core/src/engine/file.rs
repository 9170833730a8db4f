//! File-backed engine: one pretty-printed JSON file per document.
//!
//! Layout: `<data_dir>/<collection>/<id>.json`, plus `index.json` in each
//! collection directory holding the document ids in insertion order.

use super::{field_matches, window, Engine, Page};
use crate::error::Result;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

const INDEX_FILE: &str = "index.json";

#[derive(Debug)]
pub struct FileEngine {
    data_dir: PathBuf,
    /// Serializes index rewrites
    write_lock: Mutex<()>,
}

impl FileEngine {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    /// Ensure a collection directory exists.
    pub async fn ensure_collection(&self, collection: &str) -> Result<()> {
        tokio::fs::create_dir_all(self.collection_dir(collection)).await?;
        Ok(())
    }

    fn collection_dir(&self, collection: &str) -> PathBuf {
        self.data_dir.join(collection)
    }

    fn index_path(&self, collection: &str) -> PathBuf {
        self.collection_dir(collection).join(INDEX_FILE)
    }

    fn document_path(&self, collection: &str, id: &Uuid) -> PathBuf {
        self.collection_dir(collection).join(format!("{}.json", id))
    }

    async fn load_index(&self, collection: &str) -> Result<Vec<Uuid>> {
        match tokio::fs::read(self.index_path(collection)).await {
            Ok(data) => Ok(serde_json::from_slice(&data)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save_index(&self, collection: &str, index: &[Uuid]) -> Result<()> {
        let data = serde_json::to_vec_pretty(index)?;
        write_atomic(&self.index_path(collection), &data).await
    }

    async fn read_document(&self, collection: &str, id: &Uuid) -> Result<Option<Value>> {
        match tokio::fs::read(self.document_path(collection, id)).await {
            Ok(data) => Ok(Some(serde_json::from_slice(&data)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Read the documents behind `ids`, skipping index entries whose file is gone.
    async fn read_all(&self, collection: &str, ids: &[Uuid]) -> Result<Vec<Value>> {
        let mut docs = Vec::with_capacity(ids.len());
        for id in ids {
            match self.read_document(collection, id).await? {
                Some(doc) => docs.push(doc),
                None => warn!(%collection, %id, "index points at a missing document"),
            }
        }
        Ok(docs)
    }
}

/// Write through a sibling `.tmp` file and rename it over `path`, so readers
/// see either the old or the new content.
async fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    tokio::fs::write(&tmp, data).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait::async_trait]
impl Engine for FileEngine {
    #[instrument(skip(self))]
    async fn find_one(&self, collection: &str, id: &Uuid) -> Result<Option<Value>> {
        self.read_document(collection, id).await
    }

    #[instrument(skip(self, value))]
    async fn find_by(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<Value>> {
        let index = self.load_index(collection).await?;
        let docs = self.read_all(collection, &index).await?;
        Ok(docs
            .into_iter()
            .filter(|doc| field_matches(doc, field, value))
            .collect())
    }

    #[instrument(skip(self))]
    async fn find(&self, collection: &str, page: Option<Page>) -> Result<Vec<Value>> {
        let index = self.load_index(collection).await?;
        let ids = window(index.into_iter(), page);
        self.read_all(collection, &ids).await
    }

    #[instrument(skip(self, doc))]
    async fn save(&self, collection: &str, id: &Uuid, doc: Value) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.ensure_collection(collection).await?;

        let data = serde_json::to_vec_pretty(&doc)?;
        write_atomic(&self.document_path(collection, id), &data).await?;

        let mut index = self.load_index(collection).await?;
        if !index.contains(id) {
            index.push(*id);
            self.save_index(collection, &index).await?;
        }
        debug!(%collection, %id, "saved document");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, collection: &str, id: &Uuid) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let existed = match tokio::fs::remove_file(self.document_path(collection, id)).await {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => return Err(e.into()),
        };

        let mut index = self.load_index(collection).await?;
        let before = index.len();
        index.retain(|entry| entry != id);
        if index.len() != before {
            self.save_index(collection, &index).await?;
        }
        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn find_keeps_insertion_order() {
        let dir = TempDir::new().unwrap();
        let engine = FileEngine::new(dir.path());
        let ids: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        for (n, id) in ids.iter().enumerate() {
            engine.save("items", id, json!({"n": n})).await.unwrap();
        }

        let page = engine.find("items", Some(Page::nth(1, 2))).await.unwrap();
        assert_eq!(page, vec![json!({"n": 2}), json!({"n": 3})]);

        let all = engine.find("items", None).await.unwrap();
        assert_eq!(all.len(), 5);
    }

    #[tokio::test]
    async fn resave_keeps_position() {
        let dir = TempDir::new().unwrap();
        let engine = FileEngine::new(dir.path());
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        engine.save("items", &first, json!({"v": "a"})).await.unwrap();
        engine.save("items", &second, json!({"v": "b"})).await.unwrap();
        engine.save("items", &first, json!({"v": "c"})).await.unwrap();

        let all = engine.find("items", None).await.unwrap();
        assert_eq!(all, vec![json!({"v": "c"}), json!({"v": "b"})]);
    }

    #[tokio::test]
    async fn saves_leave_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let engine = FileEngine::new(dir.path());
        let id = Uuid::new_v4();
        engine.save("items", &id, json!({"v": 1})).await.unwrap();
        engine.save("items", &id, json!({"v": 2})).await.unwrap();

        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(dir.path().join("items")).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();

        let mut expected = vec![format!("{}.json", id), INDEX_FILE.to_string()];
        expected.sort();
        assert_eq!(names, expected);
        assert_eq!(engine.find_one("items", &id).await.unwrap(), Some(json!({"v": 2})));
    }

    #[tokio::test]
    async fn find_by_field() {
        let dir = TempDir::new().unwrap();
        let engine = FileEngine::new(dir.path());
        engine
            .save("users", &Uuid::new_v4(), json!({"email": "a@example.com"}))
            .await
            .unwrap();
        engine
            .save("users", &Uuid::new_v4(), json!({"email": "b@example.com"}))
            .await
            .unwrap();

        let found = engine
            .find_by("users", "email", &json!("b@example.com"))
            .await
            .unwrap();
        assert_eq!(found, vec![json!({"email": "b@example.com"})]);
    }

    #[tokio::test]
    async fn missing_collection_is_empty() {
        let dir = TempDir::new().unwrap();
        let engine = FileEngine::new(dir.path());
        assert!(engine.find("nothing", None).await.unwrap().is_empty());
        assert!(engine
            .find_one("nothing", &Uuid::new_v4())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn delete_removes_file_and_index_entry() {
        let dir = TempDir::new().unwrap();
        let engine = FileEngine::new(dir.path());
        let id = Uuid::new_v4();
        engine.save("items", &id, json!({})).await.unwrap();

        assert!(engine.delete("items", &id).await.unwrap());
        assert!(!engine.delete("items", &id).await.unwrap());
        assert!(engine.find("items", None).await.unwrap().is_empty());
        assert!(!engine.document_path("items", &id).exists());
    }
}
