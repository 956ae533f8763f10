//! Routing of messaging client events.
//!
//! Pairing codes go to the [`PairingStore`], inbound messages that pass the
//! filter go to the [`WebhookDispatcher`], readiness is logged.

use crate::messenger::ClientEvent;
use crate::pairing::{render_qr_terminal, PairingCode, PairingStore};
use crate::webhook::{should_forward, DeliveryOutcome, WebhookDispatcher, WebhookPayload};
use std::sync::Arc;
use tokio::sync::broadcast;

/// What happened to one event.
#[derive(Debug)]
pub enum EventOutcome {
    /// Pairing code stored
    PairingStored,
    /// Pairing code could not be rendered
    PairingFailed,
    /// Session established
    Ready,
    /// Message dropped by the filter
    Ignored,
    /// Message delivered to the receivers
    Forwarded(Vec<DeliveryOutcome>),
}

/// Dispatches client events to the pairing store and webhooks.
#[derive(Clone)]
pub struct EventRouter {
    pairing: Arc<PairingStore>,
    dispatcher: Arc<WebhookDispatcher>,
    print_qr: bool,
}

impl EventRouter {
    pub fn new(pairing: Arc<PairingStore>, dispatcher: Arc<WebhookDispatcher>) -> Self {
        Self {
            pairing,
            dispatcher,
            print_qr: false,
        }
    }

    /// Also print pairing codes to the terminal.
    pub fn with_terminal_qr(mut self, enabled: bool) -> Self {
        self.print_qr = enabled;
        self
    }

    /// Handle one event to completion.
    pub async fn handle(&self, event: ClientEvent) -> EventOutcome {
        match event {
            ClientEvent::Pairing { code } => self.on_pairing(&code),
            ClientEvent::Ready { session } => {
                match session {
                    Some(info) => tracing::info!("✅ Client ready as {}", info.wid),
                    None => tracing::info!("✅ Client ready"),
                }
                EventOutcome::Ready
            }
            ClientEvent::Message(msg) => {
                if !should_forward(&msg) {
                    tracing::debug!("Ignoring message from {}", msg.from);
                    return EventOutcome::Ignored;
                }
                tracing::info!("📩 Received from {}: {}", msg.from, msg.body);
                let payload = WebhookPayload::from(&msg);
                EventOutcome::Forwarded(self.dispatcher.dispatch(&payload).await)
            }
        }
    }

    fn on_pairing(&self, code: &str) -> EventOutcome {
        let rendered = match PairingCode::render(code) {
            Ok(rendered) => rendered,
            Err(e) => {
                tracing::error!("QR gen error: {}", e);
                return EventOutcome::PairingFailed;
            }
        };
        self.pairing.set(rendered);
        tracing::info!("QR-TEXT: {}", code);

        if self.print_qr {
            if let Ok(text) = render_qr_terminal(code) {
                println!("📱 Scan this QR code with your phone:\n\n{}", text);
            }
        }
        EventOutcome::PairingStored
    }

    /// Consume events until the client drops its sender.
    ///
    /// Message deliveries run as separate tasks so a slow receiver never
    /// holds up later events.
    pub async fn run(self, mut events: broadcast::Receiver<ClientEvent>) {
        loop {
            match events.recv().await {
                Ok(ClientEvent::Message(msg)) => {
                    let router = self.clone();
                    tokio::spawn(async move {
                        router.handle(ClientEvent::Message(msg)).await;
                    });
                }
                Ok(event) => {
                    self.handle(event).await;
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Event router lagged, {} events dropped", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Client event stream closed");
                    break;
                }
            }
        }
    }
}
