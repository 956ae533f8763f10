//! Error types for the application.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::path::PathBuf;
use thiserror::Error;

/// Errors related to configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors reported by a messaging client.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Client is not connected")]
    NotConnected,

    #[error("Send timed out after {0}s")]
    Timeout(u64),

    #[error("Send rejected: {0}")]
    Rejected(String),

    #[error("Client initialization failed: {0}")]
    Initialize(String),
}

/// Errors while downloading media referenced by a send request.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
}

/// Errors while delivering an inbound message to a webhook.
#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Receiver answered with status {0}")]
    Status(u16),
}

/// Errors while rendering a pairing code.
#[derive(Error, Debug)]
pub enum PairingError {
    #[error("QR generation failed: {0}")]
    Qr(#[from] qrcode::types::QrError),
}

/// Errors surfaced by the HTTP gateway.
///
/// Each variant maps to the status and short text body the REST clients
/// expect; details only go to the log.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Invalid request: {0}")]
    Validation(&'static str),

    #[error("Send failed: {source}")]
    Send {
        reply: &'static str,
        #[source]
        source: ClientError,
    },

    #[error("Media fetch failed: {source}")]
    Fetch {
        reply: &'static str,
        #[source]
        source: FetchError,
    },
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            GatewayError::Validation(usage) => (StatusCode::BAD_REQUEST, usage).into_response(),
            GatewayError::Send { reply, source } => {
                tracing::error!("Send failed: {}", source);
                (StatusCode::INTERNAL_SERVER_ERROR, reply).into_response()
            }
            GatewayError::Fetch { reply, source } => {
                tracing::error!("Media fetch failed: {}", source);
                (StatusCode::INTERNAL_SERVER_ERROR, reply).into_response()
            }
        }
    }
}
