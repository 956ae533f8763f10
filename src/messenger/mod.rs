//! Messaging client abstraction.
//!
//! The gateway never speaks the messaging protocol itself. Everything it needs
//! from the account (sending, inbound events, readiness) goes through the
//! [`MessagingClient`] trait so the HTTP layer and the webhook path can run
//! against any backend, including fakes in tests.

mod types;

pub mod console;

pub use types::{
    chat_id_for, ButtonsMessage, ClientEvent, InboundMessage, ListMessage, MediaAttachment,
    OutgoingContent, QuickReplyButton, SendOptions, SendReceipt, SessionInfo, TemplateButton,
    TemplateButtonsMessage, CONTACT_DOMAIN, GROUP_SUFFIX, SINGLE_SELECT_LIST, STATUS_BROADCAST,
};

use crate::error::ClientError;
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Capacity of client event channels.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Capability exposed by a messaging account backend.
#[async_trait]
pub trait MessagingClient: Send + Sync {
    /// Start the client. Events are emitted to subscribers afterwards.
    async fn initialize(&self) -> Result<(), ClientError>;

    /// Send one message to a chat address.
    ///
    /// # Arguments
    /// * `chat_id` - Full chat address (see [`chat_id_for`])
    /// * `content` - Message content
    /// * `options` - Caption and other per-send options
    async fn send_message(
        &self,
        chat_id: &str,
        content: OutgoingContent,
        options: SendOptions,
    ) -> Result<SendReceipt, ClientError>;

    /// Subscribe to pairing, readiness and inbound message events.
    fn subscribe(&self) -> broadcast::Receiver<ClientEvent>;

    /// Current session descriptor, `None` until the account is connected.
    fn session_info(&self) -> Option<SessionInfo>;

    /// Get the platform name for logging purposes.
    fn platform_name(&self) -> &'static str;
}
