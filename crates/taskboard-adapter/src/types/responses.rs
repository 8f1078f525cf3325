/*
[INPUT]:  Auth endpoint and error response bodies
[OUTPUT]: Deserializable session, user and PostgREST error shapes
[POS]:    Data layer - non-row payloads the client reads
[UPDATE]: When auth or error payloads change
*/

use serde::{Deserialize, Serialize};

use super::ids::UserId;

/// Session issued by the token and signup endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub expires_in: u64,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub refresh_token: String,
    pub user: AuthUser,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

/// Signup answers with a session when email confirmation is disabled and
/// with the bare user otherwise.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SignUpResponse {
    Session(AuthSession),
    User(AuthUser),
}

/// Error body returned by the relational API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PostgrestErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

/// Error body returned by the auth API. Older deployments use
/// `error`/`error_description`, newer ones `msg`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
}

impl PostgrestErrorBody {
    pub fn summary(&self) -> String {
        let mut text = self.message.clone().unwrap_or_else(|| "unknown error".to_string());
        if let Some(details) = self.details.as_deref().filter(|d| !d.is_empty()) {
            text.push_str(" (");
            text.push_str(details);
            text.push(')');
        }
        text
    }
}

impl AuthErrorBody {
    pub fn summary(&self) -> String {
        self.msg
            .clone()
            .or_else(|| self.error_description.clone())
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| "authentication rejected".to_string())
    }
}
