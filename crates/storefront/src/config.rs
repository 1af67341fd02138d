use anyhow::{Context, Result, anyhow};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_GATEWAY_URL: &str = "http://127.0.0.1:8000";

/// Where role and user id are read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RoleSource {
    /// Decode the access-token payload.
    #[default]
    Token,
    /// Use the values stored at login.
    Stored,
}

impl FromStr for RoleSource {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "token" => Ok(RoleSource::Token),
            "stored" => Ok(RoleSource::Stored),
            other => Err(anyhow!(
                "SESSION_ROLE_SOURCE must be 'token' or 'stored', got '{other}'"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SocketConfig {
    pub reconnect_attempts: u32,
    pub connect_timeout: Duration,
    pub reconnect_delay: Duration,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            reconnect_attempts: 5,
            connect_timeout: Duration::from_secs(10),
            reconnect_delay: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub gateway_url: String,
    pub http_timeout: Duration,
    pub socket: SocketConfig,
    pub session_file: Option<PathBuf>,
    pub role_source: RoleSource,
    pub jwt_secret: Option<String>,
    pub otel_endpoint: Option<String>,
    pub is_dev: bool,
    pub enable_file_log: bool,
}

impl Config {
    pub fn new(gateway_url: impl Into<String>) -> Self {
        Self {
            gateway_url: gateway_url.into().trim_end_matches('/').to_string(),
            http_timeout: Duration::from_secs(10),
            socket: SocketConfig::default(),
            session_file: None,
            role_source: RoleSource::default(),
            jwt_secret: None,
            otel_endpoint: None,
            is_dev: false,
            enable_file_log: false,
        }
    }

    pub fn init() -> Result<Self> {
        let gateway_url =
            std::env::var("GATEWAY_URL").unwrap_or_else(|_| DEFAULT_GATEWAY_URL.to_string());
        let mut config = Config::new(gateway_url);

        if let Some(secs) = parse_var::<u64>("HTTP_TIMEOUT_SECS")? {
            config.http_timeout = Duration::from_secs(secs);
        }

        if let Some(attempts) = parse_var::<u32>("SOCKET_RECONNECT_ATTEMPTS")? {
            config.socket.reconnect_attempts = attempts;
        }

        if let Some(secs) = parse_var::<u64>("SOCKET_TIMEOUT_SECS")? {
            config.socket.connect_timeout = Duration::from_secs(secs);
        }

        if let Some(source) = parse_var::<RoleSource>("SESSION_ROLE_SOURCE")? {
            config.role_source = source;
        }

        config.session_file = std::env::var("SESSION_FILE").ok().map(PathBuf::from);
        config.jwt_secret = std::env::var("JWT_SECRET").ok().filter(|s| !s.is_empty());
        config.otel_endpoint = std::env::var("OTEL_ENDPOINT").ok().filter(|s| !s.is_empty());
        config.is_dev = flag("DEV_MODE");
        config.enable_file_log = flag("ENABLE_FILE_LOG");

        Ok(config)
    }

    /// Socket.IO endpoint on the gateway, websocket transport only.
    pub fn socket_url(&self) -> String {
        let ws_base = if let Some(rest) = self.gateway_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.gateway_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.gateway_url.clone()
        };
        format!("{ws_base}/socket.io/?EIO=4&transport=websocket")
    }
}

fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow!("{e}"))
            .with_context(|| format!("{name} has an invalid value: '{raw}'")),
        Err(_) => Ok(None),
    }
}

fn flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false)
}
