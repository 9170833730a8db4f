//! Email payloads.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Generic outgoing email.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EmailContent {
    #[validate(email)]
    pub email: String,
    pub full_name: String,
    pub subject: String,
    pub content: String,
}

/// Email carrying a verification token.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EmailValidation {
    #[validate(email)]
    pub email: String,
    pub full_name: String,
    pub subject: String,
    pub token: String,
}
