use crate::{
    abstract_trait::{realtime::DynRealtimeChannel, session::DynSessionStorage},
    cache::{FileSessionStorage, MemorySessionStorage},
    chat::ChatSessionController,
    config::Config,
    di::DependenciesInject,
    realtime::SocketIoChannel,
    service::GatewayHttp,
};
use anyhow::{Context, Result};
use prometheus_client::{encoding::text::encode, registry::Registry};
use shared::{abstract_trait::DynJwtService, config::JwtConfig, utils::Metrics};
use std::sync::Arc;
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub jwt_config: DynJwtService,
    pub session_storage: DynSessionStorage,
    pub di_container: DependenciesInject,
    pub registry: Arc<Mutex<Registry>>,
    pub metrics: Metrics,
}

/// A connected chat controller and the task feeding it inbound events.
pub struct ChatRuntime {
    pub controller: Arc<ChatSessionController>,
    pub channel: Arc<SocketIoChannel>,
    pub inbound_task: JoinHandle<()>,
}

impl ChatRuntime {
    pub fn shutdown(self) {
        self.channel.close();
        self.inbound_task.abort();
    }
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let jwt_config = Arc::new(JwtConfig::new(config.jwt_secret.as_deref())) as DynJwtService;

        let session_storage: DynSessionStorage = match &config.session_file {
            Some(path) => {
                info!("Session persisted to {}", path.display());
                Arc::new(FileSessionStorage::new(path))
            }
            None => Arc::new(MemorySessionStorage::new()),
        };

        let metrics = Metrics::new();
        let mut registry = Registry::default();
        metrics.register(&mut registry);

        let http = GatewayHttp::new(&config, session_storage.clone(), metrics.clone())
            .context("Failed to create gateway client")?;

        let di_container = DependenciesInject::new(
            &http,
            session_storage.clone(),
            jwt_config.clone(),
            config.role_source,
        );

        info!("Storefront client ready for {}", config.gateway_url);

        Ok(Self {
            config,
            jwt_config,
            session_storage,
            di_container,
            registry: Arc::new(Mutex::new(registry)),
            metrics,
        })
    }

    /// Opens the real-time connection and starts a chat controller on it.
    /// Must be called from within a tokio runtime.
    pub fn connect_chat(&self) -> ChatRuntime {
        let (channel, inbound) =
            SocketIoChannel::connect(self.config.socket_url(), self.config.socket.clone());
        let channel = Arc::new(channel);

        let controller = Arc::new(ChatSessionController::new(
            self.di_container.chat_clients.clone(),
            channel.clone() as DynRealtimeChannel,
            self.di_container.session.clone(),
        ));

        let inbound_task = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.run(inbound).await })
        };

        ChatRuntime {
            controller,
            channel,
            inbound_task,
        }
    }

    /// Prometheus text exposition of the gateway request metrics.
    pub async fn render_metrics(&self) -> Result<String> {
        let registry = self.registry.lock().await;
        let mut buffer = String::new();
        encode(&mut buffer, &registry).context("Failed to encode metrics")?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abstract_trait::session::SessionStorageTrait;
    use shared::utils::{Method, Status};

    #[tokio::test]
    async fn state_wires_memory_session_and_metrics() {
        let state = AppState::new(Config::new("http://127.0.0.1:9")).unwrap();

        assert!(!state.di_container.session.is_authenticated());

        state.metrics.record(Method::Get, Status::Error, 0.01);
        let text = state.render_metrics().await.unwrap();
        assert!(text.contains("gateway_requests_total"));
    }

    #[tokio::test]
    async fn session_file_config_selects_file_storage() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::new("http://127.0.0.1:9");
        config.session_file = Some(dir.path().join("session.json"));

        let state = AppState::new(config).unwrap();
        state.di_container.session.logout();

        assert!(state.session_storage.get().is_empty());
    }
}
