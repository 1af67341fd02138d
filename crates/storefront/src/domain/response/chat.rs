use crate::domain::{deserialize_id, response::session::Role};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    Customer,
    Admin,
    System,
}

impl From<Role> for ChatRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Customer => ChatRole::Customer,
            Role::Admin => ChatRole::Admin,
        }
    }
}

// The chat service stores a free-form sender role and defaults it to
// "customer"; anything unknown or missing is treated the same way.
impl<'de> Deserialize<'de> for ChatRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(match raw.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("admin") => ChatRole::Admin,
            Some("system") => ChatRole::System,
            _ => ChatRole::Customer,
        })
    }
}

/// A chat line as exchanged over HTTP history and the real-time channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(deserialize_with = "deserialize_id")]
    pub order_id: i64,
    #[serde(default = "default_chat_role")]
    pub role: ChatRole,
    #[serde(default)]
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub time: String,
    /// Correlation id stamped by the sending client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_msg_id: Option<String>,
}

fn default_chat_role() -> ChatRole {
    ChatRole::Customer
}

impl ChatMessage {
    pub fn is_system(&self) -> bool {
        self.role == ChatRole::System
    }
}
