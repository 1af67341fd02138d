mod controller;
mod transcript;

pub use self::controller::{ADMIN_DISPLAY_NAME, ChatSessionController, ChatState, InboundOutcome};
pub use self::transcript::{EntryStyle, Placeholder, Transcript, TranscriptEntry};
