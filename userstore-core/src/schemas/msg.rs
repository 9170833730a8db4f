//! Plain message bodies.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Msg {
    pub msg: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultMsg {
    pub msg: String,
    pub result: ResultKind,
}

impl ResultMsg {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            result: ResultKind::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            result: ResultKind::Error,
        }
    }
}
