//! Identity of the signed-in customer.

use serde::{Deserialize, Serialize};

use super::id::UserId;

/// User profile returned by `/login` and persisted under the `user` key.
///
/// Fields the client does not interpret are preserved in `extra` so the
/// stored JSON round-trips without loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SessionUser {
    /// Create a user with only a username set.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: None,
            username: username.into(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            extra: serde_json::Map::new(),
        }
    }

    /// "First Last", falling back to the username.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}
