//! WhatsApp gateway - CLI entry point.
//!
//! Provides subcommands for running the gateway and inspecting configuration.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use whatsapp_gateway::cli::{Cli, Commands};
use whatsapp_gateway::config::{default_config_path, Config};
use whatsapp_gateway::messenger::console::ConsoleClient;
use whatsapp_gateway::server;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            let mut config = Config::load(cli.config).context("Failed to load configuration")?;
            if let Some(port) = port {
                config.port = port;
            }

            server::run(config, Arc::new(ConsoleClient::new()))
                .await
                .context("Failed to run gateway")?;
        }
        Commands::Status => {
            print_status(cli.config);
        }
    }

    Ok(())
}

/// Print configuration status.
fn print_status(config_path: Option<std::path::PathBuf>) {
    println!("📊 WhatsApp Gateway Status\n");

    match Config::load(config_path) {
        Ok(config) => {
            println!("✅ Configuration: Loaded");
            println!("   Listen: {}", config.bind_address());
            println!("   Send timeout: {}s", config.send_timeout.as_secs());
            println!("   Fetch timeout: {}s", config.fetch_timeout.as_secs());
            println!("   Webhook timeout: {}s", config.webhook_timeout.as_secs());
            println!();
            println!("🔗 Webhooks:");
            if config.webhook_urls.is_empty() {
                println!("   None configured (inbound messages are only logged)");
            }
            for url in &config.webhook_urls {
                println!("   {}", url);
            }
        }
        Err(e) => {
            println!("❌ Configuration: Invalid");
            println!("   Error: {}", e);
            println!();
            println!("Create config at {}:", default_config_path().display());
            println!(r#"  {{"port": 3100, "webhook_urls": ["https://example.com/hook"]}}"#);
            println!("or set PORT, TEST_WEBHOOK_URL and PROD_WEBHOOK_URL.");
        }
    }
}
