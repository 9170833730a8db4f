mod output;
pub mod ui;
mod users;

pub use output::{print_output, OutputFormat};
pub use users::{
    create_user, init_superuser, list_users, purge_tokens, set_active, show_user, validate_email,
    Store,
};
