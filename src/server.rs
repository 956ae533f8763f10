//! Process wiring: client start-up, event routing and the HTTP listener.

use crate::config::Config;
use crate::events::EventRouter;
use crate::gateway::{router, AppState};
use crate::messenger::MessagingClient;
use crate::pairing::PairingStore;
use crate::webhook::WebhookDispatcher;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Run the gateway until Ctrl-C.
pub async fn run(config: Config, client: Arc<dyn MessagingClient>) -> Result<()> {
    let pairing = Arc::new(PairingStore::new());
    let dispatcher = Arc::new(
        WebhookDispatcher::new(config.webhook_urls.clone(), config.webhook_timeout)
            .context("Failed to build webhook client")?,
    );
    if dispatcher.urls().is_empty() {
        tracing::warn!("No webhook URLs configured, inbound messages will only be logged");
    }

    // Subscribe before initializing so the first pairing code is not missed.
    let events = client.subscribe();
    let event_task = tokio::spawn(
        EventRouter::new(pairing.clone(), dispatcher)
            .with_terminal_qr(true)
            .run(events),
    );

    client
        .initialize()
        .await
        .context("Failed to initialize messaging client")?;
    tracing::info!("{} client initialized", client.platform_name());

    let http = reqwest::Client::builder()
        .timeout(config.fetch_timeout)
        .build()
        .context("Failed to build media HTTP client")?;
    let state = AppState {
        client,
        pairing,
        http,
        send_timeout: config.send_timeout,
    };

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!("🚀 Listening on http://{}", address);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    event_task.abort();
    tracing::info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
