use crate::domain::response::chat::{ChatMessage, ChatRole};
use serde::Serialize;
use validator::Validate;

/// HTTP fallback for posting a chat line.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct SendChatRequest {
    #[validate(range(min = 1))]
    pub order_id: i64,
    pub role: ChatRole,
    pub name: String,
    #[validate(length(min = 1))]
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_msg_id: Option<String>,
}

impl From<&ChatMessage> for SendChatRequest {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            order_id: msg.order_id,
            role: msg.role,
            name: msg.name.clone(),
            content: msg.content.clone(),
            client_msg_id: msg.client_msg_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct SystemNotifyRequest {
    #[validate(range(min = 1))]
    pub order_id: i64,
    #[validate(length(min = 1))]
    pub content: String,
}
