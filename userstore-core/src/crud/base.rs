//! Generic create/read/update/delete over one document type.

use crate::engine::{Document, Engine, Page};
use crate::error::Result;
use serde::Serialize;
use serde_json::{Map, Value};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;
use validator::Validate;

/// Explicit field assignments for a merge-update.
///
/// A key that is absent leaves the stored field alone; a key mapped to
/// `null` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Changes(Map<String, Value>);

impl Changes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an assignment, builder style.
    pub fn set(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.0.insert(field.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, field: &str, value: impl Into<Value>) {
        self.0.insert(field.to_string(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fields of a typed update schema. Fields the schema leaves unset must
    /// be skipped during serialization so they read as "not provided".
    pub fn from_schema<U: Serialize>(obj_in: &U) -> Result<Self> {
        match serde_json::to_value(obj_in)? {
            Value::Object(map) => Ok(Self(map)),
            _ => Ok(Self::default()),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
}

impl From<Map<String, Value>> for Changes {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Input of an update: a typed schema or a raw field mapping.
#[derive(Debug, Clone)]
pub enum UpdateInput<U> {
    Schema(U),
    Fields(Changes),
}

impl<U> From<Changes> for UpdateInput<U> {
    fn from(changes: Changes) -> Self {
        Self::Fields(changes)
    }
}

impl<U: Serialize + Validate> UpdateInput<U> {
    /// Validate (schemas only) and flatten into assignments.
    pub fn into_changes(self) -> Result<Changes> {
        match self {
            Self::Schema(obj_in) => {
                obj_in.validate()?;
                Changes::from_schema(&obj_in)
            }
            Self::Fields(changes) => Ok(changes),
        }
    }
}

/// Fields assigned when a document is built and never rewritten by a merge.
const IMMUTABLE_FIELDS: [&str; 2] = ["id", "created"];

/// Apply `changes` to `db_obj`, touching only keys the document already has.
/// `id` and `created` are skipped.
pub fn merge<M: Document>(db_obj: &M, changes: &Changes) -> Result<M> {
    let mut doc = db_obj.to_document()?;
    if let Value::Object(fields) = &mut doc {
        for (field, value) in &changes.0 {
            if IMMUTABLE_FIELDS.contains(&field.as_str()) {
                debug!(collection = M::COLLECTION, %field, "ignoring immutable field");
                continue;
            }
            if let Some(slot) = fields.get_mut(field) {
                *slot = value.clone();
            }
        }
    }
    M::from_document(doc)
}

/// CRUD over documents `M`, created from `C` and updated from `U`.
#[derive(Debug)]
pub struct CrudBase<M, C, U> {
    engine: Arc<dyn Engine>,
    page_size: u64,
    _schemas: PhantomData<fn() -> (M, C, U)>,
}

impl<M, C, U> Clone for CrudBase<M, C, U> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            page_size: self.page_size,
            _schemas: PhantomData,
        }
    }
}

impl<M, C, U> CrudBase<M, C, U>
where
    M: Document,
    C: Validate + Send,
    U: Serialize + Validate + Send,
{
    pub fn new(engine: Arc<dyn Engine>, page_size: u64) -> Self {
        Self {
            engine,
            page_size,
            _schemas: PhantomData,
        }
    }

    pub fn engine(&self) -> &Arc<dyn Engine> {
        &self.engine
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    #[instrument(skip(self), fields(collection = M::COLLECTION))]
    pub async fn get(&self, id: Uuid) -> Result<Option<M>> {
        self.engine
            .find_one(M::COLLECTION, &id)
            .await?
            .map(M::from_document)
            .transpose()
    }

    /// With `page_break`, the `page`-th window of `page_size` documents;
    /// without it, the whole collection.
    #[instrument(skip(self), fields(collection = M::COLLECTION))]
    pub async fn get_multi(&self, page: u64, page_break: bool) -> Result<Vec<M>> {
        let window = page_break.then(|| Page::nth(page, self.page_size));
        self.engine
            .find(M::COLLECTION, window)
            .await?
            .into_iter()
            .map(M::from_document)
            .collect()
    }

    /// Documents whose `field` equals `value`, in insertion order.
    pub async fn find_by(&self, field: &str, value: impl Into<Value>) -> Result<Vec<M>> {
        self.engine
            .find_by(M::COLLECTION, field, &value.into())
            .await?
            .into_iter()
            .map(M::from_document)
            .collect()
    }

    pub async fn find_one_by(&self, field: &str, value: impl Into<Value>) -> Result<Option<M>> {
        Ok(self.find_by(field, value).await?.into_iter().next())
    }

    #[instrument(skip(self, obj_in), fields(collection = M::COLLECTION))]
    pub async fn create(&self, obj_in: C) -> Result<M>
    where
        M: From<C>,
    {
        obj_in.validate()?;
        self.insert(M::from(obj_in)).await
    }

    /// Persist an already-built document.
    pub async fn insert(&self, db_obj: M) -> Result<M> {
        self.save(&db_obj).await?;
        Ok(db_obj)
    }

    #[instrument(skip(self, db_obj, obj_in), fields(collection = M::COLLECTION, id = %db_obj.id()))]
    pub async fn update(&self, db_obj: M, obj_in: UpdateInput<U>) -> Result<M> {
        let changes = obj_in.into_changes()?;
        self.apply(db_obj, &changes).await
    }

    /// Merge `changes` into `db_obj` and persist the result.
    pub async fn apply(&self, db_obj: M, changes: &Changes) -> Result<M> {
        let updated = merge(&db_obj, changes)?;
        self.save(&updated).await?;
        debug!(collection = M::COLLECTION, id = %updated.id(), "merged update");
        Ok(updated)
    }

    #[instrument(skip(self), fields(collection = M::COLLECTION))]
    pub async fn remove(&self, id: Uuid) -> Result<Option<M>> {
        let Some(db_obj) = self.get(id).await? else {
            return Ok(None);
        };
        self.engine.delete(M::COLLECTION, &id).await?;
        Ok(Some(db_obj))
    }

    async fn save(&self, db_obj: &M) -> Result<()> {
        self.engine
            .save(M::COLLECTION, &db_obj.id(), db_obj.to_document()?)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MemoryEngine;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: Uuid,
        title: String,
        body: Option<String>,
        pinned: bool,
    }

    impl Document for Note {
        const COLLECTION: &'static str = "notes";

        fn id(&self) -> Uuid {
            self.id
        }
    }

    #[derive(Debug, Validate)]
    struct NoteCreate {
        #[validate(length(min = 1))]
        title: String,
    }

    impl From<NoteCreate> for Note {
        fn from(obj_in: NoteCreate) -> Self {
            Self {
                id: Uuid::new_v4(),
                title: obj_in.title,
                body: Some("draft".into()),
                pinned: false,
            }
        }
    }

    #[serde_with::skip_serializing_none]
    #[derive(Debug, Default, Serialize, Validate)]
    struct NoteUpdate {
        #[validate(length(min = 1))]
        title: Option<String>,
        pinned: Option<bool>,
    }

    fn crud(page_size: u64) -> CrudBase<Note, NoteCreate, NoteUpdate> {
        CrudBase::new(Arc::new(MemoryEngine::new()), page_size)
    }

    async fn create(crud: &CrudBase<Note, NoteCreate, NoteUpdate>, title: &str) -> Note {
        crud.create(NoteCreate {
            title: title.into(),
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn create_then_get() {
        let crud = crud(20);
        let note = create(&crud, "first").await;
        assert_eq!(crud.get(note.id).await.unwrap(), Some(note));
        assert_eq!(crud.get(Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn create_validates_before_writing() {
        let crud = crud(20);
        let err = crud
            .create(NoteCreate {
                title: String::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, crate::StoreError::Validation(_)));
        assert!(crud.get_multi(0, false).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_multi_pages_in_insertion_order() {
        let crud = crud(2);
        for title in ["a", "b", "c", "d", "e"] {
            create(&crud, title).await;
        }

        let page: Vec<String> = crud
            .get_multi(1, true)
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.title)
            .collect();
        assert_eq!(page, vec!["c", "d"]);

        assert_eq!(crud.get_multi(2, true).await.unwrap().len(), 1);
        assert_eq!(crud.get_multi(1, false).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn update_touches_only_given_fields() {
        let crud = crud(20);
        let note = create(&crud, "title").await;

        let updated = crud
            .update(
                note.clone(),
                UpdateInput::Schema(NoteUpdate {
                    pinned: Some(true),
                    ..NoteUpdate::default()
                }),
            )
            .await
            .unwrap();

        assert_eq!(
            updated,
            Note {
                pinned: true,
                ..note.clone()
            }
        );
        assert_eq!(crud.get(note.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn explicit_null_clears_and_unknown_keys_are_ignored() {
        let crud = crud(20);
        let note = create(&crud, "title").await;

        let changes = Changes::new().set("body", Value::Null).set("color", "red");
        let updated = crud.update(note.clone(), changes.into()).await.unwrap();

        assert_eq!(updated.body, None);
        assert_eq!(updated.title, note.title);
        let stored = crud.engine().find_one("notes", &note.id).await.unwrap().unwrap();
        assert!(stored.get("color").is_none());
        assert_eq!(stored["body"], json!(null));
    }

    #[tokio::test]
    async fn id_cannot_be_rewritten() {
        let crud = crud(20);
        let note = create(&crud, "title").await;

        let changes = Changes::new()
            .set("id", Uuid::new_v4().to_string())
            .set("pinned", true);
        let updated = crud.update(note.clone(), changes.into()).await.unwrap();

        assert_eq!(updated.id, note.id);
        assert!(updated.pinned);
        let all = crud.get_multi(0, false).await.unwrap();
        assert_eq!(all, vec![updated]);
    }

    #[tokio::test]
    async fn update_rejects_invalid_schema() {
        let crud = crud(20);
        let note = create(&crud, "title").await;
        let err = crud
            .update(
                note,
                UpdateInput::Schema(NoteUpdate {
                    title: Some(String::new()),
                    ..NoteUpdate::default()
                }),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, crate::StoreError::Validation(_)));
    }

    #[tokio::test]
    async fn remove_returns_the_document_once() {
        let crud = crud(20);
        let note = create(&crud, "title").await;
        assert_eq!(crud.remove(note.id).await.unwrap(), Some(note.clone()));
        assert_eq!(crud.remove(note.id).await.unwrap(), None);
        assert_eq!(crud.get(note.id).await.unwrap(), None);
    }
}
