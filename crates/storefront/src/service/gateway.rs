use crate::{abstract_trait::session::DynSessionStorage, config::Config, service::auth_headers};
use anyhow::{Context as _, Result};
use opentelemetry::{
    Context, KeyValue,
    global::{self, BoxedTracer},
    trace::{Span, SpanKind, TraceContextExt, Tracer},
};
use reqwest::{Client, RequestBuilder, header::HeaderMap};
use serde::{Serialize, de::DeserializeOwned};
use shared::{
    errors::{ClientError, ErrorResponse},
    utils::{HeaderInjector, Method, Metrics, Status as StatusUtils, TracingContext},
};
use tokio::time::Instant;
use tracing::{debug, error, info};

/// HTTP transport shared by every gateway client.
///
/// Holds no per-call state; each call reads the current session so a login
/// or logout is picked up by the very next request.
#[derive(Clone)]
pub struct GatewayHttp {
    client: Client,
    base_url: String,
    session: DynSessionStorage,
    metrics: Metrics,
    component: &'static str,
}

impl std::fmt::Debug for GatewayHttp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayHttp")
            .field("base_url", &self.base_url)
            .field("component", &self.component)
            .finish()
    }
}

impl GatewayHttp {
    pub fn new(config: &Config, session: DynSessionStorage, metrics: Metrics) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .connect_timeout(config.http_timeout)
            .build()
            .context("Failed to build gateway HTTP client")?;

        Ok(Self {
            client,
            base_url: config.gateway_url.trim_end_matches('/').to_string(),
            session,
            metrics,
            component: "gateway-client",
        })
    }

    /// Same transport, reported under another tracer name.
    pub fn for_component(&self, component: &'static str) -> Self {
        Self {
            component,
            ..self.clone()
        }
    }

    pub async fn get<T>(&self, operation: &str, path: &str) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        self.send::<(), T>(operation, Method::Get, path, None, true)
            .await
    }

    pub async fn post<B, T>(&self, operation: &str, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        self.send(operation, Method::Post, path, Some(body), true)
            .await
    }

    /// POST without the session's bearer token (login, register).
    pub async fn post_anonymous<B, T>(
        &self,
        operation: &str,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        self.send(operation, Method::Post, path, Some(body), false)
            .await
    }

    pub async fn put<B, T>(&self, operation: &str, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        self.send(operation, Method::Put, path, Some(body), true)
            .await
    }

    pub async fn put_empty<T>(&self, operation: &str, path: &str) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        self.send::<(), T>(operation, Method::Put, path, None, true)
            .await
    }

    fn get_tracer(&self) -> BoxedTracer {
        global::tracer(self.component)
    }

    fn inject_trace_context(&self, cx: &Context, headers: &mut HeaderMap) {
        global::get_text_map_propagator(|propagator| {
            propagator.inject_context(cx, &mut HeaderInjector(headers))
        });
    }

    fn start_tracing(&self, operation_name: &str, attributes: Vec<KeyValue>) -> TracingContext {
        let start_time = Instant::now();
        let tracer = self.get_tracer();
        let mut span = tracer
            .span_builder(operation_name.to_string())
            .with_kind(SpanKind::Client)
            .with_attributes(attributes)
            .start(&tracer);

        debug!("Starting operation: {operation_name}");

        span.add_event(
            "Operation started",
            vec![KeyValue::new("operation", operation_name.to_string())],
        );

        let cx = Context::current_with_span(span);
        TracingContext { cx, start_time }
    }

    fn complete_tracing(
        &self,
        tracing_ctx: &TracingContext,
        method: Method,
        is_success: bool,
        message: &str,
    ) {
        let (status_str, status) = if is_success {
            ("SUCCESS", StatusUtils::Success)
        } else {
            ("ERROR", StatusUtils::Error)
        };
        let elapsed = tracing_ctx.start_time.elapsed().as_secs_f64();

        tracing_ctx.cx.span().add_event(
            "Operation completed",
            vec![
                KeyValue::new("status", status_str),
                KeyValue::new("duration_secs", elapsed.to_string()),
                KeyValue::new("message", message.to_string()),
            ],
        );

        if is_success {
            info!("Operation completed successfully: {message}");
        } else {
            error!("Operation failed: {message}");
        }

        self.metrics.record(method, status, elapsed);

        tracing_ctx.cx.span().end();
    }

    fn builder(&self, method: &Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        match method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
        }
    }

    async fn send<B, T>(
        &self,
        operation: &str,
        method: Method,
        path: &str,
        body: Option<&B>,
        authenticated: bool,
    ) -> Result<T, ClientError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let tracing_ctx = self.start_tracing(
            operation,
            vec![
                KeyValue::new("component", self.component),
                KeyValue::new("http.request.method", format!("{method:?}").to_uppercase()),
                KeyValue::new("url.path", path.to_string()),
            ],
        );

        let mut headers = if authenticated {
            auth_headers(&self.session.get())
        } else {
            auth_headers(&Default::default())
        };
        self.inject_trace_context(&tracing_ctx.cx, &mut headers);

        let mut request = self.builder(&method, path).headers(headers);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let err = ClientError::from(e);
                self.complete_tracing(&tracing_ctx, method, false, &format!("{operation}: {err}"));
                return Err(err);
            }
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                let err = ClientError::Connectivity(e.to_string());
                self.complete_tracing(&tracing_ctx, method, false, &format!("{operation}: {err}"));
                return Err(err);
            }
        };

        if !status.is_success() {
            let message = ErrorResponse::parse(&text).into_message().unwrap_or_default();
            let err = ClientError::from_status(status.as_u16(), message);
            self.complete_tracing(
                &tracing_ctx,
                method,
                false,
                &format!("{operation} returned {}: {err}", status.as_u16()),
            );
            return Err(err);
        }

        match serde_json::from_str::<T>(&text) {
            Ok(value) => {
                self.complete_tracing(&tracing_ctx, method, true, operation);
                Ok(value)
            }
            Err(e) => {
                let err = ClientError::from(e);
                self.complete_tracing(&tracing_ctx, method, false, &format!("{operation}: {err}"));
                Err(err)
            }
        }
    }
}
