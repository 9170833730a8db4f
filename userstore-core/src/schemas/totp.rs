//! TOTP provisioning shapes.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use totp_rs::Secret;
use validator::Validate;

const SECRET_BYTES: usize = 20;

/// A freshly generated TOTP secret, not yet bound to a user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewTotp {
    /// Base32 secret, the value persisted on activation
    #[validate(length(min = 16, max = 128))]
    pub secret: String,
    /// Secret grouped for manual entry into an authenticator app
    #[validate(length(min = 16))]
    pub key: String,
    /// `otpauth://` provisioning URI
    #[validate(length(min = 1))]
    pub uri: String,
}

impl NewTotp {
    /// Random secret with its provisioning URI for `account` under `issuer`.
    pub fn generate(account: &str, issuer: &str) -> Self {
        let mut raw = vec![0u8; SECRET_BYTES];
        rand::thread_rng().fill_bytes(&mut raw);
        let secret = Secret::Raw(raw).to_encoded().to_string();

        let uri = format!(
            "otpauth://totp/{issuer}:{account}?secret={secret}&issuer={issuer}",
            issuer = urlencoding::encode(issuer),
            account = urlencoding::encode(account),
            secret = secret,
        );

        Self {
            key: pretty_key(&secret),
            secret,
            uri,
        }
    }
}

/// Group a base32 secret by four characters for manual entry.
fn pretty_key(secret: &str) -> String {
    secret
        .as_bytes()
        .chunks(4)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Request to enable TOTP: a first code plus the provisioning URI.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EnableTotp {
    #[validate(length(min = 6, max = 7))]
    pub claim: String,
    #[validate(length(min = 1))]
    pub uri: String,
    #[validate(length(min = 8, max = 64))]
    #[serde(default)]
    pub password: Option<String>,
}
