use serde::Deserialize;

/// Error body returned by the backend services.
///
/// Services are not consistent: most reply with `{"message": ...}`, a few
/// (chat history, gateway routing) with `{"error": ...}`.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorResponse {
    pub fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    pub fn into_message(self) -> Option<String> {
        self.message
            .or(self.error)
            .filter(|msg| !msg.trim().is_empty())
    }
}
