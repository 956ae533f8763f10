//! HTTP gateway.
//!
//! REST endpoints that turn JSON requests into a single messaging client
//! send each, plus the pairing QR page and the readiness check.

pub mod media;
mod send;

pub use send::{
    LegacyButtonsRequest, ListRequest, MediaUrlRequest, PhoneValue, ReplyButtonsRequest,
    SendImageUrlRequest, SendRequest, SendTextRequest, ValidMediaUrl,
};

use crate::error::ClientError;
use crate::messenger::{chat_id_for, MessagingClient, OutgoingContent, SendOptions, SendReceipt};
use crate::pairing::{render_qr_page, PairingStore};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

/// Shared state for the gateway handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<dyn MessagingClient>,
    pub pairing: Arc<PairingStore>,
    /// HTTP client used to download media
    pub http: reqwest::Client,
    /// Upper bound for one send through the client
    pub send_timeout: Duration,
}

impl AppState {
    /// Send to the personal chat of `phone`, bounded by `send_timeout`.
    pub async fn send(
        &self,
        phone: &str,
        content: OutgoingContent,
        options: SendOptions,
    ) -> Result<SendReceipt, ClientError> {
        let chat_id = chat_id_for(phone);
        let kind = content.label();

        let sent = tokio::time::timeout(
            self.send_timeout,
            self.client.send_message(&chat_id, content, options),
        )
        .await
        .unwrap_or(Err(ClientError::Timeout(self.send_timeout.as_secs())))?;

        tracing::info!(
            "Sent {} to {} via {} ({})",
            kind,
            chat_id,
            self.client.platform_name(),
            sent.message_id
        );
        Ok(sent)
    }
}

/// Build the gateway router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/qr", get(qr_page))
        .route("/status", get(status))
        .route("/api/send-text", post(send::send_text))
        .route("/api/send-image-url", post(send::send_image_url))
        .route("/api/send-list", post(send::send_list))
        .route("/api/send-reply-buttons", post(send::send_reply_buttons))
        .route("/api/send-buttons", post(send::send_buttons))
        .route("/api/send-media-url", post(send::send_media_url))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `GET /qr`: latest pairing code as an HTML page.
async fn qr_page(State(state): State<AppState>) -> Html<String> {
    Html(render_qr_page(state.pairing.latest().as_ref()))
}

/// `GET /status`: readiness of the messaging client.
async fn status(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.client.session_info().is_some() {
        (StatusCode::OK, "Ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Not ready")
    }
}
