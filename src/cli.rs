//! CLI argument parsing with subcommands.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// HTTP gateway for a WhatsApp account.
///
/// Serves REST send endpoints and forwards inbound messages to webhooks.
#[derive(Parser)]
#[command(name = "whatsapp-gateway")]
#[command(about = "HTTP gateway for a WhatsApp account (REST send endpoints, inbound webhooks)")]
#[command(version)]
pub struct Cli {
    /// Path to a JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP gateway (console messaging backend, events read from stdin)
    Serve {
        /// Listening port, overrides configuration
        #[arg(long)]
        port: Option<u16>,
    },

    /// Show current configuration status
    Status,
}
