use thiserror::Error;

/// Common result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("token mismatch between key and user")]
    TokenMismatch,
    #[error("invalid document in {collection}: {reason}")]
    InvalidDocument { collection: String, reason: String },
    #[error("totp error: {0}")]
    Totp(String),
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("other error: {0}")]
    Other(String),
}
