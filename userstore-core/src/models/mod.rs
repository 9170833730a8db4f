//! Persisted documents.

mod token;
mod user;
mod user_group;

pub use token::RefreshToken;
pub use user::User;
pub use user_group::UserGroup;

use chrono::{DateTime, SubsecRound, Utc};

/// Current time truncated to whole seconds.
pub fn now_sec() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}
