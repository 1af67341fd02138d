mod catalog;
mod chat;
mod gateway;
mod order;
mod session;
mod user;

pub use self::catalog::CatalogGatewayClientService;
pub use self::chat::ChatGatewayClientService;
pub use self::gateway::GatewayHttp;
pub use self::order::OrderGatewayClientService;
pub use self::session::{DEFAULT_DISPLAY_NAME, DEFAULT_LOGIN_ERROR, SessionStore, auth_headers};
pub use self::user::UserGatewayClientService;

#[cfg(test)]
pub(crate) mod test_support {
    use super::GatewayHttp;
    use crate::{
        abstract_trait::session::SessionStorageTrait, cache::MemorySessionStorage,
        config::Config, domain::response::session::Session,
    };
    use shared::utils::Metrics;
    use std::sync::Arc;

    /// Transport pointed at a mock gateway, logged in with `token` if given.
    pub fn http(base_url: &str, token: Option<&str>) -> (GatewayHttp, Metrics) {
        let storage = Arc::new(MemorySessionStorage::new());
        if let Some(token) = token {
            storage
                .set(Session {
                    token: Some(token.to_string()),
                    ..Default::default()
                })
                .unwrap();
        }
        let metrics = Metrics::new();
        let http = GatewayHttp::new(&Config::new(base_url), storage, metrics.clone()).unwrap();
        (http, metrics)
    }
}
