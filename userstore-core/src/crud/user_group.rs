//! User groups: named permission sets with unique names.

use super::base::{CrudBase, UpdateInput};
use crate::config::Settings;
use crate::engine::Engine;
use crate::error::{Result, StoreError};
use crate::models::UserGroup;
use crate::schemas::{UserGroupCreate, UserGroupUpdate};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

impl From<UserGroupUpdate> for UpdateInput<UserGroupUpdate> {
    fn from(obj_in: UserGroupUpdate) -> Self {
        Self::Schema(obj_in)
    }
}

#[derive(Debug, Clone)]
pub struct UserGroupCrud {
    base: CrudBase<UserGroup, UserGroupCreate, UserGroupUpdate>,
}

impl UserGroupCrud {
    pub fn new(engine: Arc<dyn Engine>, settings: &Settings) -> Self {
        Self {
            base: CrudBase::new(engine, settings.multi_max),
        }
    }

    pub fn base(&self) -> &CrudBase<UserGroup, UserGroupCreate, UserGroupUpdate> {
        &self.base
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<UserGroup>> {
        self.base.get(id).await
    }

    pub async fn get_multi(&self, page: u64, page_break: bool) -> Result<Vec<UserGroup>> {
        self.base.get_multi(page, page_break).await
    }

    #[instrument(skip(self))]
    pub async fn get_by_name(&self, name: &str) -> Result<Option<UserGroup>> {
        self.base.find_one_by("name", name).await
    }

    pub async fn get_active_groups(&self) -> Result<Vec<UserGroup>> {
        self.base.find_by("is_active", true).await
    }

    /// Groups whose permission list contains `permission`.
    pub async fn get_groups_by_permission(&self, permission: &str) -> Result<Vec<UserGroup>> {
        self.base.find_by("permissions", permission).await
    }

    /// The groups among `ids` that exist, in the order given. Unknown ids are
    /// skipped.
    pub async fn get_by_ids(&self, ids: &[Uuid]) -> Result<Vec<UserGroup>> {
        let mut groups = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(group) = self.base.get(*id).await? {
                groups.push(group);
            }
        }
        Ok(groups)
    }

    #[instrument(skip(self, obj_in), fields(name = %obj_in.name))]
    pub async fn create(&self, obj_in: UserGroupCreate) -> Result<UserGroup> {
        if self.get_by_name(&obj_in.name).await?.is_some() {
            return Err(StoreError::AlreadyExists(format!("group: {}", obj_in.name)));
        }
        let group = self.base.create(obj_in).await?;
        info!(group_id = %group.id, name = %group.name, "created user group");
        Ok(group)
    }

    /// Merge-update; a rename onto another group's name is refused.
    #[instrument(skip(self, db_obj, obj_in), fields(group_id = %db_obj.id))]
    pub async fn update(
        &self,
        db_obj: UserGroup,
        obj_in: impl Into<UpdateInput<UserGroupUpdate>>,
    ) -> Result<UserGroup> {
        let changes = obj_in.into().into_changes()?;
        if let Some(Value::String(name)) = changes.get("name") {
            if let Some(holder) = self.get_by_name(name).await? {
                if holder.id != db_obj.id {
                    return Err(StoreError::AlreadyExists(format!("group: {}", name)));
                }
            }
        }
        let group = self.base.apply(db_obj, &changes).await?;
        info!(group_id = %group.id, "updated user group");
        Ok(group)
    }

    pub async fn remove(&self, id: Uuid) -> Result<Option<UserGroup>> {
        let removed = self.base.remove(id).await?;
        if removed.is_some() {
            info!(group_id = %id, "removed user group");
        }
        Ok(removed)
    }
}
