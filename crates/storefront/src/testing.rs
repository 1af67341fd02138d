//! Fakes shared by unit tests across modules.

use crate::{
    abstract_trait::{
        chat::ChatGatewayClientTrait,
        realtime::{OutboundEvent, RealtimeChannelTrait},
        user::UserGatewayClientTrait,
    },
    cache::MemorySessionStorage,
    config::RoleSource,
    domain::{
        requests::{
            auth::{LoginRequest, RegisterRequest},
            chat::{SendChatRequest, SystemNotifyRequest},
            user::{ChangePasswordRequest, UpdateProfileRequest},
        },
        response::{
            auth::{LoginResponse, MessageResponse, RegisterResponse},
            chat::ChatMessage,
            session::{Role, Session},
            user::UserProfile,
        },
    },
    service::SessionStore,
};
use async_trait::async_trait;
use jsonwebtoken::{EncodingKey, Header, encode};
use shared::{config::Claims, config::JwtConfig, errors::ClientError};
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};
use tokio::sync::oneshot;

pub fn token(user_id: i64, role: Role) -> String {
    let claims = Claims {
        user_id,
        role: Some(role.to_string()),
        exp: None,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"server-secret"),
    )
    .unwrap()
}

/// Users client for code paths that never call the users service.
pub struct NoUsers;

#[async_trait]
impl UserGatewayClientTrait for NoUsers {
    async fn login(&self, _req: &LoginRequest) -> Result<LoginResponse, ClientError> {
        unimplemented!("login is not expected here")
    }
    async fn register(&self, _req: &RegisterRequest) -> Result<RegisterResponse, ClientError> {
        unimplemented!("register is not expected here")
    }
    async fn find_by_id(&self, _id: i64) -> Result<UserProfile, ClientError> {
        unimplemented!("user lookup is not expected here")
    }
    async fn update_profile(
        &self,
        _req: &UpdateProfileRequest,
    ) -> Result<UserProfile, ClientError> {
        unimplemented!("profile update is not expected here")
    }
    async fn change_password(
        &self,
        _req: &ChangePasswordRequest,
    ) -> Result<MessageResponse, ClientError> {
        unimplemented!("password change is not expected here")
    }
}

/// Session store already logged in as `role`.
pub fn logged_in(user_id: i64, role: Role, name: &str) -> SessionStore {
    let storage = Arc::new(MemorySessionStorage::with_session(Session {
        token: Some(token(user_id, role)),
        user_id: Some(user_id),
        role: Some(role),
        display_name: Some(name.to_string()),
        email: Some(format!("user{user_id}@example.com")),
    }));
    SessionStore::new(
        storage,
        Arc::new(NoUsers),
        Arc::new(JwtConfig::default()),
        RoleSource::Token,
    )
}

/// In-process channel that records what was emitted.
#[derive(Default)]
pub struct ScriptedChannel {
    connected: AtomicBool,
    emitted: Mutex<Vec<OutboundEvent>>,
}

impl ScriptedChannel {
    pub fn connected() -> Arc<Self> {
        let channel = Self::default();
        channel.connected.store(true, Ordering::SeqCst);
        Arc::new(channel)
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub fn emitted(&self) -> Vec<OutboundEvent> {
        self.emitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl RealtimeChannelTrait for ScriptedChannel {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn emit(&self, event: OutboundEvent) -> Result<(), ClientError> {
        if !self.is_connected() {
            return Err(ClientError::ChannelDisconnected);
        }
        self.emitted.lock().unwrap().push(event);
        Ok(())
    }
}

type HistoryReply = Result<Vec<ChatMessage>, ClientError>;

/// Chat service whose history replies are released by the test.
#[derive(Default)]
pub struct ScriptedChat {
    ready: Mutex<HashMap<i64, HistoryReply>>,
    gated: Mutex<HashMap<i64, oneshot::Receiver<HistoryReply>>>,
    notified: Mutex<Vec<SystemNotifyRequest>>,
    notify_fails: AtomicBool,
}

impl ScriptedChat {
    pub fn with_history(self, order_id: i64, reply: HistoryReply) -> Self {
        self.ready.lock().unwrap().insert(order_id, reply);
        self
    }

    /// History for `order_id` resolves only when the returned sender fires.
    pub fn gate(&self, order_id: i64) -> oneshot::Sender<HistoryReply> {
        let (tx, rx) = oneshot::channel();
        self.gated.lock().unwrap().insert(order_id, rx);
        tx
    }

    pub fn failing_notify(self) -> Self {
        self.notify_fails.store(true, Ordering::SeqCst);
        self
    }

    pub fn notified(&self) -> Vec<SystemNotifyRequest> {
        self.notified.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatGatewayClientTrait for ScriptedChat {
    async fn history(&self, order_id: i64) -> Result<Vec<ChatMessage>, ClientError> {
        let gated = self.gated.lock().unwrap().remove(&order_id);
        if let Some(rx) = gated {
            return rx
                .await
                .unwrap_or_else(|_| Err(ClientError::Connectivity("gate dropped".into())));
        }
        self.ready
            .lock()
            .unwrap()
            .remove(&order_id)
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn send_message(&self, _req: &SendChatRequest) -> Result<MessageResponse, ClientError> {
        Ok(MessageResponse::default())
    }

    async fn system_notify(
        &self,
        req: &SystemNotifyRequest,
    ) -> Result<MessageResponse, ClientError> {
        if self.notify_fails.load(Ordering::SeqCst) {
            return Err(ClientError::Connectivity("chat service down".into()));
        }
        self.notified.lock().unwrap().push(req.clone());
        Ok(MessageResponse {
            status: Some("success".into()),
            ..Default::default()
        })
    }
}
