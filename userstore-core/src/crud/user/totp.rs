//! TOTP secret lifecycle (RFC 6238, SHA1, 6 digits, 30 s steps).

use super::UserCrud;
use crate::crud::base::Changes;
use crate::error::{Result, StoreError};
use crate::models::User;
use crate::schemas::NewTotp;
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;
use totp_rs::{Algorithm, Secret, TOTP};
use tracing::{info, instrument, warn};
use validator::Validate;

const TOTP_DIGITS: usize = 6;
const TOTP_SKEW: u8 = 1;
const TOTP_STEP: u64 = 30;

fn build_totp(secret: &str) -> Result<TOTP> {
    let bytes = Secret::Encoded(secret.to_string())
        .to_bytes()
        .map_err(|e| StoreError::Totp(format!("invalid secret: {}", e)))?;
    TOTP::new(Algorithm::SHA1, TOTP_DIGITS, TOTP_SKEW, TOTP_STEP, bytes)
        .map_err(|e| StoreError::Totp(format!("totp creation failed: {}", e)))
}

impl UserCrud {
    /// Generate a secret and provisioning URI for `user`; nothing is stored.
    pub fn new_totp(&self, user: &User) -> NewTotp {
        NewTotp::generate(&user.email, &self.totp_issuer)
    }

    #[instrument(skip(self, db_obj, totp_in), fields(user_id = %db_obj.id))]
    pub async fn activate_totp(&self, db_obj: User, totp_in: &NewTotp) -> Result<User> {
        totp_in.validate()?;
        build_totp(&totp_in.secret)?;
        let user = self
            .apply(
                db_obj,
                Changes::new().set("totp_secret", totp_in.secret.clone()),
            )
            .await?;
        info!(user_id = %user.id, "totp activated");
        Ok(user)
    }

    /// Clear both the secret and the replay counter.
    #[instrument(skip(self, db_obj), fields(user_id = %db_obj.id))]
    pub async fn deactivate_totp(&self, db_obj: User) -> Result<User> {
        let changes = Changes::new()
            .set("totp_secret", Value::Null)
            .set("totp_counter", Value::Null);
        let user = self.apply(db_obj, changes).await?;
        info!(user_id = %user.id, "totp deactivated");
        Ok(user)
    }

    #[instrument(skip(self, db_obj), fields(user_id = %db_obj.id))]
    pub async fn update_totp_counter(&self, db_obj: User, new_counter: u64) -> Result<User> {
        self.apply(db_obj, Changes::new().set("totp_counter", new_counter))
            .await
    }

    /// Check `code` against the user's secret at the current time.
    pub fn verify_totp(&self, user: &User, code: &str) -> Result<Option<u64>> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| StoreError::Other(format!("system clock before epoch: {}", e)))?
            .as_secs();
        self.verify_totp_at(user, code, now)
    }

    /// Check `code` at unix time `now`, allowing one step of skew either way.
    ///
    /// Returns the matching time step, which the caller should store with
    /// [`UserCrud::update_totp_counter`]. Steps at or below the stored counter
    /// are rejected as replays.
    pub fn verify_totp_at(&self, user: &User, code: &str, now: u64) -> Result<Option<u64>> {
        let Some(secret) = user.totp_secret.as_deref() else {
            return Ok(None);
        };
        let totp = build_totp(secret)?;

        let current = now / TOTP_STEP;
        let first = current.saturating_sub(TOTP_SKEW as u64);
        for step in first..=current + TOTP_SKEW as u64 {
            let expected = totp.generate(step * TOTP_STEP);
            if !bool::from(expected.as_bytes().ct_eq(code.as_bytes())) {
                continue;
            }
            if user.totp_counter.is_some_and(|last| step <= last) {
                warn!(user_id = %user.id, step, "totp code replayed");
                return Ok(None);
            }
            return Ok(Some(step));
        }
        Ok(None)
    }
}
