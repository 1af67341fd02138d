use crate::domain::response::chat::{ChatMessage, ChatRole};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStyle {
    Own,
    Peer,
    System,
}

impl EntryStyle {
    pub fn for_message(message: &ChatMessage, own_role: Option<ChatRole>) -> Self {
        if message.is_system() {
            EntryStyle::System
        } else if Some(message.role) == own_role {
            EntryStyle::Own
        } else {
            EntryStyle::Peer
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptEntry {
    pub message: ChatMessage,
    pub style: EntryStyle,
}

/// Shown instead of entries while there is nothing to list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Placeholder {
    Loading,
    Empty,
    LoadFailed(String),
}

/// Visible lines of the open conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    loading: bool,
    load_error: Option<String>,
}

impl Transcript {
    pub fn loading() -> Self {
        Self {
            loading: true,
            ..Default::default()
        }
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn placeholder(&self) -> Option<Placeholder> {
        if let Some(error) = &self.load_error {
            return Some(Placeholder::LoadFailed(error.clone()));
        }
        if !self.entries.is_empty() {
            return None;
        }
        Some(if self.loading {
            Placeholder::Loading
        } else {
            Placeholder::Empty
        })
    }

    pub fn push(&mut self, message: ChatMessage, style: EntryStyle) {
        self.entries.push(TranscriptEntry { message, style });
    }

    /// Puts persisted history in front of whatever arrived while it loaded.
    ///
    /// Lines that arrived live and are already part of the history are
    /// dropped.
    pub fn apply_history(&mut self, history: Vec<ChatMessage>, own_role: Option<ChatRole>) {
        let live = std::mem::take(&mut self.entries);

        self.entries = history
            .into_iter()
            .map(|message| TranscriptEntry {
                style: EntryStyle::for_message(&message, own_role),
                message,
            })
            .collect();

        for entry in live {
            if !self
                .entries
                .iter()
                .any(|e| same_line(&e.message, &entry.message))
            {
                self.entries.push(entry);
            }
        }

        self.loading = false;
        self.load_error = None;
    }

    /// History could not be fetched; the error replaces it. Lines that arrived
    /// meanwhile stay visible.
    pub fn fail(&mut self, message: String) {
        self.loading = false;
        self.load_error = Some(message);
    }
}

fn same_line(a: &ChatMessage, b: &ChatMessage) -> bool {
    match (&a.client_msg_id, &b.client_msg_id) {
        (Some(x), Some(y)) => x == y,
        _ => {
            a.order_id == b.order_id
                && a.role == b.role
                && a.name == b.name
                && a.content == b.content
                && a.time == b.time
        }
    }
}
