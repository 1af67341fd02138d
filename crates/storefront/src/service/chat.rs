use crate::{
    abstract_trait::chat::ChatGatewayClientTrait,
    domain::{
        requests::chat::{SendChatRequest, SystemNotifyRequest},
        response::{auth::MessageResponse, chat::ChatMessage},
    },
    service::GatewayHttp,
};
use async_trait::async_trait;
use shared::errors::ClientError;
use tracing::{debug, info};
use validator::Validate;

const CHAT_PATH: &str = "/chat/api/v1/chat";

#[derive(Debug, Clone)]
pub struct ChatGatewayClientService {
    http: GatewayHttp,
}

impl ChatGatewayClientService {
    pub fn new(http: &GatewayHttp) -> Self {
        Self {
            http: http.for_component("chat-service-client"),
        }
    }
}

#[async_trait]
impl ChatGatewayClientTrait for ChatGatewayClientService {
    async fn history(&self, order_id: i64) -> Result<Vec<ChatMessage>, ClientError> {
        let messages: Vec<ChatMessage> = self
            .http
            .get("ChatHistory", &format!("{CHAT_PATH}/{order_id}"))
            .await?;

        debug!("Loaded {} message(s) for order {order_id}", messages.len());
        Ok(messages)
    }

    async fn send_message(&self, req: &SendChatRequest) -> Result<MessageResponse, ClientError> {
        req.validate()?;

        self.http
            .post("SendChatMessage", &format!("{CHAT_PATH}/send"), req)
            .await
    }

    async fn system_notify(
        &self,
        req: &SystemNotifyRequest,
    ) -> Result<MessageResponse, ClientError> {
        req.validate()?;
        info!("System notification for order {}", req.order_id);

        self.http
            .post("SystemNotify", &format!("{CHAT_PATH}/system_notify"), req)
            .await
    }
}
