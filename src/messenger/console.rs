//! Console messaging backend.
//!
//! Development backend that stands in for a real account. Outbound sends are
//! logged, and inbound events are read from stdin as JSON lines:
//!
//! ```text
//! {"event":"ready","session":{"wid":"201000000000@c.us","pushname":"Desk"}}
//! {"event":"message","from":"201234567890@c.us","body":"hi","timestamp":1700000000,"type":"chat","id":"ABCD","fromMe":false}
//! {"event":"pairing","code":"2@refresh"}
//! ```

use super::{
    ClientEvent, MessagingClient, OutgoingContent, SendOptions, SendReceipt, SessionInfo,
    EVENT_CHANNEL_CAPACITY,
};
use crate::error::ClientError;
use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;

/// Messaging client driven by stdin and the log.
pub struct ConsoleClient {
    events: broadcast::Sender<ClientEvent>,
    session: Arc<RwLock<Option<SessionInfo>>>,
}

impl ConsoleClient {
    /// Create a new console client.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            events,
            session: Arc::new(RwLock::new(None)),
        }
    }

    /// Feed one event into the client as if the account had produced it.
    pub fn inject(&self, event: ClientEvent) {
        publish(&self.events, &self.session, event);
    }

    /// Read JSON-line events from `reader` until it is exhausted.
    pub async fn pump<R>(&self, reader: R)
    where
        R: AsyncBufRead + Unpin,
    {
        pump_lines(reader, self.events.clone(), self.session.clone()).await;
    }
}

impl Default for ConsoleClient {
    fn default() -> Self {
        Self::new()
    }
}

fn publish(
    events: &broadcast::Sender<ClientEvent>,
    session: &RwLock<Option<SessionInfo>>,
    event: ClientEvent,
) {
    if let ClientEvent::Ready { session: info } = &event {
        let info = info.clone().unwrap_or_else(|| SessionInfo {
            wid: "console@c.us".to_string(),
            pushname: "console".to_string(),
            platform: "console".to_string(),
        });
        if let Ok(mut slot) = session.write() {
            *slot = Some(info);
        }
    }

    // No subscribers is not an error for a console session.
    let _ = events.send(event);
}

async fn pump_lines<R>(
    reader: R,
    events: broadcast::Sender<ClientEvent>,
    session: Arc<RwLock<Option<SessionInfo>>>,
) where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<ClientEvent>(line) {
                    Ok(event) => publish(&events, &session, event),
                    Err(e) => tracing::warn!("Ignoring console input: {}", e),
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Console input closed: {}", e);
                break;
            }
        }
    }
}

#[async_trait]
impl MessagingClient for ConsoleClient {
    async fn initialize(&self) -> Result<(), ClientError> {
        let code = format!("console@{}", uuid::Uuid::new_v4().simple());
        self.inject(ClientEvent::Pairing { code });

        tokio::spawn(pump_lines(
            BufReader::new(tokio::io::stdin()),
            self.events.clone(),
            self.session.clone(),
        ));

        tracing::info!("Console client started, reading events from stdin");
        Ok(())
    }

    async fn send_message(
        &self,
        chat_id: &str,
        content: OutgoingContent,
        options: SendOptions,
    ) -> Result<SendReceipt, ClientError> {
        if self.session_info().is_none() {
            return Err(ClientError::NotConnected);
        }

        let message_id = uuid::Uuid::new_v4().to_string();
        let rendered = serde_json::to_string(&content)
            .map_err(|e| ClientError::Rejected(e.to_string()))?;
        tracing::info!(
            message_id = %message_id,
            chat_id = %chat_id,
            kind = content.label(),
            caption = options.caption.as_deref().unwrap_or(""),
            "Outbound message: {}",
            rendered
        );

        Ok(SendReceipt { message_id })
    }

    fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    fn session_info(&self) -> Option<SessionInfo> {
        self.session.read().ok().and_then(|s| s.clone())
    }

    fn platform_name(&self) -> &'static str {
        "Console"
    }
}
