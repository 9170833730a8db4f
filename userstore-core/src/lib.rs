//! Data-access and schema-validation layer for user accounts: request and
//! response schemas, a document engine handle, generic CRUD, and user,
//! user-group and refresh-token CRUD with password hashing and TOTP
//! bookkeeping.

mod config;
pub mod crud;
pub mod engine;
mod error;
mod init;
pub mod models;
pub mod schemas;

pub use config::Settings;
pub use crud::{Changes, CrudBase, TokenCrud, UpdateInput, UserCrud, UserGroupCrud};
pub use engine::{Document, Engine, FileEngine, MemoryEngine, Page};
pub use error::{Result, StoreError};
pub use init::init_db;
pub use models::{RefreshToken, User, UserGroup};
