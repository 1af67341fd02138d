mod client;
mod error;
mod http;

pub use self::client::ClientError;
pub use self::error::ErrorResponse;
pub use self::http::HttpError;
