//! CRUD components. Each one wraps a [`CrudBase`] bound to its document and
//! schema types and receives the engine handle at construction.

mod base;
mod crypto;
mod token;
pub(crate) mod user;
mod user_group;

pub use base::{merge, Changes, CrudBase, UpdateInput};
pub use crypto::{hash_password, verify_password};
pub use token::TokenCrud;
pub use user::UserCrud;
pub use user_group::UserGroupCrud;
