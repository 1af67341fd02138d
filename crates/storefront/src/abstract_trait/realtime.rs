use crate::domain::response::chat::ChatMessage;
use async_trait::async_trait;
use serde_json::{Value, json};
use shared::errors::ClientError;
use std::sync::Arc;

pub type DynRealtimeChannel = Arc<dyn RealtimeChannelTrait + Send + Sync>;

/// Events this client emits on the shared real-time connection.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundEvent {
    Join { order_id: i64 },
    Leave { order_id: i64 },
    SendMessage(ChatMessage),
}

impl OutboundEvent {
    pub fn name(&self) -> &'static str {
        match self {
            OutboundEvent::Join { .. } => "join",
            OutboundEvent::Leave { .. } => "leave",
            OutboundEvent::SendMessage(_) => "send_message",
        }
    }

    pub fn payload(&self) -> Result<Value, ClientError> {
        match self {
            OutboundEvent::Join { order_id } | OutboundEvent::Leave { order_id } => {
                Ok(json!({ "order_id": order_id }))
            }
            OutboundEvent::SendMessage(msg) => Ok(serde_json::to_value(msg)?),
        }
    }
}

/// Events delivered to the inbound queue.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    Connected,
    Disconnected,
    ReceiveMessage(ChatMessage),
}

#[async_trait]
pub trait RealtimeChannelTrait {
    fn is_connected(&self) -> bool;

    /// Queues an event for sending. Fails with `ChannelDisconnected` when the
    /// connection is down; nothing is buffered for later delivery.
    async fn emit(&self, event: OutboundEvent) -> Result<(), ClientError>;
}
