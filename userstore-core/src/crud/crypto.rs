//! bcrypt helpers, run on the blocking pool.

use crate::error::{Result, StoreError};
use bcrypt::{hash, verify};

/// Hash a password with the given bcrypt cost.
pub async fn hash_password(password: &str, cost: u32) -> Result<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hash(&password, cost))
        .await
        .map_err(|e| StoreError::Other(format!("spawn_blocking failed: {}", e)))?
        .map_err(StoreError::from)
}

/// Check a password against a stored hash. A missing or empty hash never verifies.
pub async fn verify_password(password: &str, hashed: Option<&str>) -> Result<bool> {
    let Some(hashed) = hashed.filter(|h| !h.is_empty()) else {
        return Ok(false);
    };
    let password = password.to_string();
    let hashed = hashed.to_string();
    tokio::task::spawn_blocking(move || verify(&password, &hashed))
        .await
        .map_err(|e| StoreError::Other(format!("spawn_blocking failed: {}", e)))?
        .map_err(StoreError::from)
}

/// Password hashed once per process and verified against when a login names
/// an unknown account, so both failure paths cost one bcrypt verification.
const DUMMY_PASSWORD: &str = "dummy-password-for-unknown-accounts";

pub async fn dummy_hash(cost: u32) -> Result<String> {
    hash_password(DUMMY_PASSWORD, cost).await
}
