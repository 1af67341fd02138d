use crate::domain::{
    requests::chat::{SendChatRequest, SystemNotifyRequest},
    response::{auth::MessageResponse, chat::ChatMessage},
};
use async_trait::async_trait;
use shared::errors::ClientError;
use std::sync::Arc;

pub type DynChatGatewayClient = Arc<dyn ChatGatewayClientTrait + Send + Sync>;

#[async_trait]
pub trait ChatGatewayClientTrait {
    async fn history(&self, order_id: i64) -> Result<Vec<ChatMessage>, ClientError>;
    async fn send_message(&self, req: &SendChatRequest) -> Result<MessageResponse, ClientError>;
    async fn system_notify(
        &self,
        req: &SystemNotifyRequest,
    ) -> Result<MessageResponse, ClientError>;
}
