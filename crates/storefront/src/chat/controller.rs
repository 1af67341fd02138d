use crate::{
    abstract_trait::{
        chat::DynChatGatewayClient,
        realtime::{DynRealtimeChannel, InboundEvent, OutboundEvent},
    },
    chat::transcript::{EntryStyle, Transcript},
    domain::response::{
        chat::{ChatMessage, ChatRole},
        session::Role,
    },
    service::{DEFAULT_DISPLAY_NAME, SessionStore},
};
use shared::{errors::ClientError, utils::clock_time};
use std::collections::VecDeque;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const ADMIN_DISPLAY_NAME: &str = "Administrator";

/// Unacknowledged local sends kept for echo matching.
const MAX_PENDING_ECHOES: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    Closed,
    Open { order_id: i64 },
}

impl ChatState {
    pub fn order_id(&self) -> Option<i64> {
        match self {
            ChatState::Closed => None,
            ChatState::Open { order_id } => Some(*order_id),
        }
    }
}

/// What happened to one inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundOutcome {
    Appended,
    /// Echo of a message this client already shows.
    Duplicate,
    /// Not for the open conversation.
    Dropped,
    /// Reconnected while a conversation was open; its room was joined again.
    Rejoined,
    Ignored,
}

#[derive(Debug)]
struct Inner {
    state: ChatState,
    peer_name: String,
    // bumped on every open/close so late history replies can be recognised
    epoch: u64,
    transcript: Transcript,
    pending: VecDeque<ChatMessage>,
}

/// The single support conversation of a client.
pub struct ChatSessionController {
    chat: DynChatGatewayClient,
    channel: DynRealtimeChannel,
    session: SessionStore,
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for ChatSessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSessionController")
            .field("chat", &"DynChatGatewayClient")
            .field("channel", &"DynRealtimeChannel")
            .finish()
    }
}

impl ChatSessionController {
    pub fn new(
        chat: DynChatGatewayClient,
        channel: DynRealtimeChannel,
        session: SessionStore,
    ) -> Self {
        Self {
            chat,
            channel,
            session,
            inner: Mutex::new(Inner {
                state: ChatState::Closed,
                peer_name: String::new(),
                epoch: 0,
                transcript: Transcript::default(),
                pending: VecDeque::new(),
            }),
        }
    }

    pub async fn state(&self) -> ChatState {
        self.inner.lock().await.state
    }

    pub async fn peer_name(&self) -> Option<String> {
        let inner = self.inner.lock().await;
        match inner.state {
            ChatState::Open { .. } => Some(inner.peer_name.clone()),
            ChatState::Closed => None,
        }
    }

    /// Snapshot of the visible conversation; empty while closed.
    pub async fn transcript(&self) -> Transcript {
        let inner = self.inner.lock().await;
        match inner.state {
            ChatState::Open { .. } => inner.transcript.clone(),
            ChatState::Closed => Transcript::default(),
        }
    }

    pub async fn open_chat(&self, order_id: i64, peer_name: &str) {
        let (previous, epoch) = {
            let mut inner = self.inner.lock().await;
            let previous = inner.state.order_id();
            inner.epoch += 1;
            inner.state = ChatState::Open { order_id };
            inner.peer_name = peer_name.to_string();
            inner.transcript = Transcript::loading();
            inner.pending.clear();
            (previous, inner.epoch)
        };

        info!("Opening chat for order {order_id} with {peer_name}");

        if let Some(previous) = previous.filter(|p| *p != order_id) {
            self.announce(OutboundEvent::Leave { order_id: previous }).await;
        }
        self.announce(OutboundEvent::Join { order_id }).await;

        let history = self.chat.history(order_id).await;

        let mut inner = self.inner.lock().await;
        if inner.epoch != epoch {
            debug!("Discarding stale history for order {order_id}");
            return;
        }

        match history {
            Ok(messages) => {
                debug!("Rendering {} history line(s)", messages.len());
                let own_role = self.own_role();
                inner.transcript.apply_history(messages, own_role);
            }
            Err(e) => {
                warn!("Chat history for order {order_id} failed: {e}");
                inner.transcript.fail(e.user_message());
            }
        }
    }

    pub async fn close_chat(&self) {
        let closed = {
            let mut inner = self.inner.lock().await;
            let closed = inner.state.order_id();
            if closed.is_some() {
                inner.epoch += 1;
                inner.state = ChatState::Closed;
                inner.transcript = Transcript::default();
                inner.pending.clear();
            }
            closed
        };

        if let Some(order_id) = closed {
            info!("Closing chat for order {order_id}");
            self.announce(OutboundEvent::Leave { order_id }).await;
        }
    }

    /// Sends `text` to the open conversation and shows it at once.
    pub async fn send_message(&self, text: &str) -> Result<ChatMessage, ClientError> {
        let content = text.trim();
        if content.is_empty() {
            return Err(ClientError::Validation(vec![
                "content: Message is empty".to_string(),
            ]));
        }

        let mut inner = self.inner.lock().await;
        let order_id = inner
            .state
            .order_id()
            .ok_or_else(|| ClientError::InvalidState("No conversation is open".into()))?;

        if !self.channel.is_connected() {
            return Err(ClientError::ChannelDisconnected);
        }

        let role = self.session.current_role().ok_or_else(|| {
            ClientError::NotAuthorized("Log in before sending messages".into())
        })?;

        let message = ChatMessage {
            order_id,
            role: role.into(),
            name: self.sender_name(role),
            content: content.to_string(),
            time: clock_time(),
            client_msg_id: Some(Uuid::new_v4().to_string()),
        };

        // lock held across emit so an echo cannot overtake the local entry
        self.channel
            .emit(OutboundEvent::SendMessage(message.clone()))
            .await?;

        inner.transcript.push(message.clone(), EntryStyle::Own);
        inner.pending.push_back(message.clone());
        while inner.pending.len() > MAX_PENDING_ECHOES {
            inner.pending.pop_front();
        }

        Ok(message)
    }

    pub async fn handle_inbound(&self, event: InboundEvent) -> InboundOutcome {
        match event {
            InboundEvent::Connected => {
                let open = self.inner.lock().await.state.order_id();
                match open {
                    Some(order_id) => {
                        self.announce(OutboundEvent::Join { order_id }).await;
                        InboundOutcome::Rejoined
                    }
                    None => InboundOutcome::Ignored,
                }
            }
            InboundEvent::Disconnected => {
                warn!("Chat channel disconnected");
                InboundOutcome::Ignored
            }
            InboundEvent::ReceiveMessage(message) => self.receive(message).await,
        }
    }

    /// Feeds the inbound queue into the controller until it closes.
    pub async fn run(&self, mut inbound: mpsc::Receiver<InboundEvent>) {
        while let Some(event) = inbound.recv().await {
            let outcome = self.handle_inbound(event).await;
            debug!("Inbound event handled: {outcome:?}");
        }
        info!("Inbound chat queue closed");
    }

    async fn receive(&self, message: ChatMessage) -> InboundOutcome {
        let mut inner = self.inner.lock().await;

        if inner.state.order_id() != Some(message.order_id) {
            return InboundOutcome::Dropped;
        }

        if message.is_system() {
            inner.transcript.push(message, EntryStyle::System);
            return InboundOutcome::Appended;
        }

        if take_pending(&mut inner.pending, &message) {
            return InboundOutcome::Duplicate;
        }

        let style = EntryStyle::for_message(&message, self.own_role());
        inner.transcript.push(message, style);
        InboundOutcome::Appended
    }

    async fn announce(&self, event: OutboundEvent) {
        let name = event.name();
        if let Err(e) = self.channel.emit(event).await {
            debug!("Skipped {name}: {e}");
        }
    }

    fn own_role(&self) -> Option<ChatRole> {
        self.session.current_role().map(ChatRole::from)
    }

    fn sender_name(&self, role: Role) -> String {
        match role {
            Role::Admin => ADMIN_DISPLAY_NAME.to_string(),
            Role::Customer => self
                .session
                .display_name()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
        }
    }
}

/// Removes and reports the pending local send `message` echoes.
///
/// Matches by correlation id; a message without one falls back to the
/// oldest pending send with the same role, name and content.
fn take_pending(pending: &mut VecDeque<ChatMessage>, message: &ChatMessage) -> bool {
    let position = match message.client_msg_id.as_deref() {
        Some(id) => pending
            .iter()
            .position(|p| p.client_msg_id.as_deref() == Some(id)),
        None => pending.iter().position(|p| {
            p.role == message.role && p.name == message.name && p.content == message.content
        }),
    };

    match position {
        Some(idx) => {
            pending.remove(idx);
            true
        }
        None => false,
    }
}
