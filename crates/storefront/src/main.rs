use anyhow::{Context, Result};
use dotenv::dotenv;
use shared::utils::{Telemetry, init_logger};
use std::time::Duration;
use storefront::{
    aggregator::SUPPORT_PEER_NAME, config::Config, domain::response::session::Role, state::AppState,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let config = Config::init().context("Failed to load configuration")?;

    let providers = match &config.otel_endpoint {
        Some(endpoint) => Some(
            Telemetry::new("storefront", endpoint.clone())
                .init()
                .context("Failed to initialize telemetry")?,
        ),
        None => None,
    };

    let _guard = init_logger(
        providers.as_ref().map(|p| &p.logger),
        "storefront",
        config.is_dev,
        config.enable_file_log,
    );

    let state = AppState::new(config).context("Failed to create AppState")?;
    let di = &state.di_container;

    if let (Ok(email), Ok(password)) = (
        std::env::var("STOREFRONT_EMAIL"),
        std::env::var("STOREFRONT_PASSWORD"),
    ) {
        let session = di
            .session
            .login(&email, &password)
            .await
            .map_err(|e| anyhow::anyhow!(e.user_message()))
            .context("Login failed")?;
        info!("Logged in as {:?}", session.display_name);
    } else if !di.session.is_authenticated() {
        warn!("No session and no STOREFRONT_EMAIL/STOREFRONT_PASSWORD set");
        return Ok(());
    }

    match di.session.current_role() {
        Some(Role::Admin) => {
            let dashboard = di
                .aggregator
                .load_dashboard()
                .await
                .context("Failed to load dashboard")?;
            println!("{}", serde_json::to_string_pretty(&dashboard)?);
        }
        _ => {
            let rows = di
                .aggregator
                .load_customer_orders()
                .await
                .context("Failed to load orders")?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }

    if let Ok(order_id) = std::env::var("CHAT_ORDER_ID") {
        let order_id: i64 = order_id.parse().context("CHAT_ORDER_ID must be an integer")?;
        let chat = state.connect_chat();

        chat.controller.open_chat(order_id, SUPPORT_PEER_NAME).await;

        if let Ok(text) = std::env::var("CHAT_MESSAGE") {
            // give the socket a moment to finish its handshake
            tokio::time::sleep(Duration::from_secs(1)).await;
            if let Err(e) = chat.controller.send_message(&text).await {
                warn!("Message not sent: {}", e.user_message());
            }
        }

        let transcript = chat.controller.transcript().await;
        println!("{}", serde_json::to_string_pretty(&transcript)?);

        chat.controller.close_chat().await;
        chat.shutdown();
    }

    println!("{}", state.render_metrics().await?);

    info!("Shutting down storefront...");

    if let Some(providers) = providers {
        providers.shutdown()?;
    }

    Ok(())
}
