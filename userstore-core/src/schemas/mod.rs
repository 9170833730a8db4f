//! Request/response shapes and their field constraints.
//!
//! Constraints are declared with `validator` and checked by the CRUD layer
//! before any database call.

mod emails;
mod metadata;
mod msg;
mod token;
mod totp;
mod user;
mod user_group;

pub use emails::{EmailContent, EmailValidation};
pub use metadata::{
    AsDbDict, MetadataBase, MetadataBaseCreate, MetadataBaseInDb, MetadataBaseUpdate,
    PaginatedResponse,
};
pub use msg::{Msg, ResultKind, ResultMsg};
pub use token::{
    MagicTokenPayload, RefreshTokenCreate, RefreshTokenUpdate, Token, TokenPayload, WebToken,
};
pub use totp::{EnableTotp, NewTotp};
pub use user::{
    normalize_email, UserCreate, UserCreatePublic, UserLogin, UserPublic, UserUpdate,
    UserUpdatePassword,
};
pub use user_group::{UserGroupCreate, UserGroupUpdate};
