//! WhatsApp gateway library.
//!
//! Bridges a messaging account to HTTP: REST endpoints send messages through a
//! [`MessagingClient`], and inbound messages are forwarded to webhooks.

pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod gateway;
pub mod messenger;
pub mod pairing;
pub mod server;
pub mod webhook;

// Re-export commonly used types
pub use config::Config;
pub use events::EventRouter;
pub use gateway::{router, AppState};
pub use messenger::{ClientEvent, InboundMessage, MessagingClient, OutgoingContent};
pub use pairing::PairingStore;
pub use webhook::{WebhookDispatcher, WebhookPayload};
