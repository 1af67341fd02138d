use crate::errors::http::HttpError;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("Authentication failed: {0}")]
    AuthFailure(String),

    #[error("Connectivity failure: {0}")]
    Connectivity(String),

    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    #[error("Resource missing: {0}")]
    ResourceMissing(String),

    #[error("Real-time channel is not connected")]
    ChannelDisconnected,

    #[error("{0}")]
    Http(HttpError),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Validation failed: {0:?}")]
    Validation(Vec<String>),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Session storage error: {0}")]
    Storage(String),
}

impl ClientError {
    /// Maps a non-success gateway status to its error kind.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        HttpError::from_status(status, message).into()
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::NotAuthorized(_) => Some(401),
            ClientError::ResourceMissing(_) => Some(404),
            ClientError::Http(err) => Some(err.status()),
            _ => None,
        }
    }

    /// Degradable failures are replaced by placeholder text during row joins.
    pub fn is_resource_missing(&self) -> bool {
        matches!(self, ClientError::ResourceMissing(_))
    }

    /// Message supplied by the server in the error body, if any.
    pub fn server_message(&self) -> Option<&str> {
        let msg = match self {
            ClientError::NotAuthorized(msg) | ClientError::ResourceMissing(msg) => msg.as_str(),
            ClientError::Http(err) => err.message(),
            _ => return None,
        };
        Some(msg).filter(|m| !m.trim().is_empty())
    }

    /// Text meant to be shown to the end user.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::AuthFailure(msg) => msg.clone(),
            ClientError::Connectivity(_) => "Cannot connect to the server!".to_string(),
            ClientError::NotAuthorized(_) => "Please log in to continue.".to_string(),
            ClientError::ResourceMissing(_) => self
                .server_message()
                .unwrap_or("The requested item no longer exists.")
                .to_string(),
            ClientError::ChannelDisconnected => "Lost connection to the chat server!".to_string(),
            ClientError::Http(err) => self
                .server_message()
                .map(str::to_string)
                .unwrap_or_else(|| format!("Request failed with status {}", err.status())),
            ClientError::Decode(_) => "Unexpected response from the server.".to_string(),
            ClientError::Validation(errors) => errors.join(", "),
            ClientError::InvalidState(msg) => msg.clone(),
            ClientError::Storage(_) => "Could not access the local session.".to_string(),
        }
    }
}

impl From<HttpError> for ClientError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Unauthorized(msg) => ClientError::NotAuthorized(msg),
            HttpError::NotFound(msg) => ClientError::ResourceMissing(msg),
            other => ClientError::Http(other),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ClientError::from_status(status.as_u16(), err.to_string())
        } else {
            ClientError::Connectivity(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<ValidationErrors> for ClientError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages = Vec::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| match error.code.as_ref() {
                        "email" => "Invalid email format".to_string(),
                        "length" => "Invalid length".to_string(),
                        "range" => "Value out of range".to_string(),
                        _ => format!("Invalid {field}"),
                    });
                messages.push(format!("{field}: {message}"));
            }
        }
        messages.sort();
        ClientError::Validation(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_and_not_found_get_their_own_kinds() {
        assert!(matches!(
            ClientError::from_status(401, "session expired"),
            ClientError::NotAuthorized(msg) if msg == "session expired"
        ));
        assert!(ClientError::from_status(404, "car does not exist").is_resource_missing());
    }

    #[test]
    fn other_statuses_keep_code_and_message() {
        let err = ClientError::from_status(403, "Only admins may do this");
        assert_eq!(err.status(), Some(403));
        assert_eq!(err.user_message(), "Only admins may do this");

        let err = ClientError::from_status(418, "teapot");
        assert_eq!(err.status(), Some(418));
    }

    #[test]
    fn empty_server_message_falls_back() {
        let err = ClientError::from_status(500, "");
        assert_eq!(err.server_message(), None);
        assert_eq!(err.user_message(), "Request failed with status 500");
        assert_eq!(
            ClientError::from_status(401, "Token expired").server_message(),
            Some("Token expired")
        );
    }

    #[test]
    fn connectivity_message_is_generic() {
        let err = ClientError::Connectivity("tcp connect error: refused".into());
        assert_eq!(err.user_message(), "Cannot connect to the server!");
        assert_eq!(err.status(), None);
    }
}
