use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error("HTTP {status}: {message}")]
    Other { status: u16, message: String },
}

impl HttpError {
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 => HttpError::BadRequest(message),
            401 => HttpError::Unauthorized(message),
            403 => HttpError::Forbidden(message),
            404 => HttpError::NotFound(message),
            409 => HttpError::Conflict(message),
            503 => HttpError::ServiceUnavailable(message),
            500 => HttpError::Internal(message),
            _ => HttpError::Other { status, message },
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            HttpError::BadRequest(_) => 400,
            HttpError::Unauthorized(_) => 401,
            HttpError::Forbidden(_) => 403,
            HttpError::NotFound(_) => 404,
            HttpError::Conflict(_) => 409,
            HttpError::ServiceUnavailable(_) => 503,
            HttpError::Internal(_) => 500,
            HttpError::Other { status, .. } => *status,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            HttpError::BadRequest(msg)
            | HttpError::Unauthorized(msg)
            | HttpError::Forbidden(msg)
            | HttpError::NotFound(msg)
            | HttpError::Conflict(msg)
            | HttpError::ServiceUnavailable(msg)
            | HttpError::Internal(msg) => msg,
            HttpError::Other { message, .. } => message,
        }
    }
}
