//! Inbound message filtering and webhook delivery.
//!
//! Every inbound message that passes [`should_forward`] is POSTed as JSON to
//! each configured receiver. Deliveries are independent: they run
//! concurrently, are attempted once, and their outcome is only logged.

use crate::error::WebhookError;
use crate::messenger::{InboundMessage, GROUP_SUFFIX, STATUS_BROADCAST};
use futures_util::future::join_all;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Decide whether an inbound message is forwarded to webhooks.
///
/// Status broadcasts, group messages and messages without text are dropped.
pub fn should_forward(msg: &InboundMessage) -> bool {
    if msg.from == STATUS_BROADCAST || msg.from.ends_with(GROUP_SUFFIX) {
        return false;
    }
    !msg.body.trim().is_empty()
}

/// JSON body POSTed to webhook receivers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    pub from: String,
    pub body: String,
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub from_me: bool,
}

impl From<&InboundMessage> for WebhookPayload {
    fn from(msg: &InboundMessage) -> Self {
        Self {
            from: msg.from.clone(),
            body: msg.body.clone(),
            timestamp: msg.timestamp,
            kind: msg.kind.clone(),
            id: msg.id.clone(),
            from_me: msg.from_me,
        }
    }
}

/// Result of delivering one payload to one receiver.
#[derive(Debug)]
pub struct DeliveryOutcome {
    pub url: String,
    /// HTTP status on success
    pub result: Result<u16, WebhookError>,
}

impl DeliveryOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Delivers inbound messages to the configured receivers.
#[derive(Debug, Clone)]
pub struct WebhookDispatcher {
    http: Client,
    urls: Vec<String>,
}

impl WebhookDispatcher {
    /// Create a dispatcher with its own HTTP client.
    pub fn new(urls: Vec<String>, timeout: Duration) -> Result<Self, WebhookError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http, urls))
    }

    /// Create a dispatcher reusing an existing HTTP client.
    pub fn with_client(http: Client, urls: Vec<String>) -> Self {
        let urls = urls
            .into_iter()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .collect();
        Self { http, urls }
    }

    /// Configured receivers.
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// POST the payload to every receiver and wait for all attempts.
    pub async fn dispatch(&self, payload: &WebhookPayload) -> Vec<DeliveryOutcome> {
        let deliveries = self.urls.iter().map(|url| async move {
            let result = self.deliver(url, payload).await;
            match &result {
                Ok(status) => tracing::info!("Webhook sent to {} ({})", url, status),
                Err(e) => tracing::warn!("Webhook failed for {}: {}", url, e),
            }
            DeliveryOutcome {
                url: url.clone(),
                result,
            }
        });

        join_all(deliveries).await
    }

    async fn deliver(&self, url: &str, payload: &WebhookPayload) -> Result<u16, WebhookError> {
        let response = self.http.post(url).json(payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WebhookError::Status(status.as_u16()));
        }
        Ok(status.as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn inbound(from: &str, body: &str) -> InboundMessage {
        InboundMessage {
            from: from.to_string(),
            body: body.to_string(),
            timestamp: 1_700_000_000,
            kind: "chat".to_string(),
            id: "3EB0C0FFEE".to_string(),
            from_me: false,
        }
    }

    #[test]
    fn test_should_forward_direct_message() {
        assert!(should_forward(&inbound("201234567890@c.us", "hello")));
    }

    #[test]
    fn test_should_not_forward_status_broadcast() {
        assert!(!should_forward(&inbound("status@broadcast", "story")));
    }

    #[test]
    fn test_should_not_forward_group() {
        assert!(!should_forward(&inbound("120363025246125486@g.us", "hi all")));
    }

    #[test]
    fn test_should_not_forward_blank_body() {
        assert!(!should_forward(&inbound("201234567890@c.us", "")));
        assert!(!should_forward(&inbound("201234567890@c.us", " \n\t ")));
    }

    #[test]
    fn test_payload_json_shape() {
        let payload = WebhookPayload::from(&inbound("201234567890@c.us", "hello"));
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "from": "201234567890@c.us",
                "body": "hello",
                "timestamp": 1_700_000_000,
                "type": "chat",
                "id": "3EB0C0FFEE",
                "fromMe": false
            })
        );
    }

    #[test]
    fn test_blank_urls_are_dropped() {
        let dispatcher = WebhookDispatcher::with_client(
            Client::new(),
            vec!["".to_string(), " http://a/hook ".to_string()],
        );
        assert_eq!(dispatcher.urls(), ["http://a/hook".to_string()]);
    }

    #[tokio::test]
    async fn test_dispatch_without_receivers() {
        let dispatcher = WebhookDispatcher::with_client(Client::new(), Vec::new());
        let payload = WebhookPayload::from(&inbound("1@c.us", "hi"));
        assert!(dispatcher.dispatch(&payload).await.is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_posts_payload_to_every_receiver() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/test"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/prod"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let dispatcher = WebhookDispatcher::with_client(
            Client::new(),
            vec![
                format!("{}/test", server.uri()),
                format!("{}/prod", server.uri()),
            ],
        );
        let payload = WebhookPayload::from(&inbound("201234567890@c.us", "hello"));
        let outcomes = dispatcher.dispatch(&payload).await;

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(DeliveryOutcome::is_success));

        let requests = server.received_requests().await.unwrap();
        for request in &requests {
            let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
            assert_eq!(body["body"], "hello");
            assert_eq!(body["fromMe"], false);
        }
    }

    #[tokio::test]
    async fn test_failing_receiver_does_not_block_the_other() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let broken = format!("{}/broken", server.uri());
        let ok = format!("{}/ok", server.uri());
        let dispatcher =
            WebhookDispatcher::with_client(Client::new(), vec![broken.clone(), ok.clone()]);
        let payload = WebhookPayload::from(&inbound("201234567890@c.us", "hello"));
        let outcomes = dispatcher.dispatch(&payload).await;

        let failed = outcomes.iter().find(|o| o.url == broken).unwrap();
        assert!(matches!(failed.result, Err(WebhookError::Status(500))));
        let delivered = outcomes.iter().find(|o| o.url == ok).unwrap();
        assert!(matches!(delivered.result, Ok(200)));
    }

    #[tokio::test]
    async fn test_unreachable_receiver_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        // Nothing listens on port 9 of the loopback interface.
        let dispatcher = WebhookDispatcher::new(
            vec!["http://127.0.0.1:9/hook".to_string(), server.uri()],
            Duration::from_secs(5),
        )
        .unwrap();
        let payload = WebhookPayload::from(&inbound("201234567890@c.us", "hello"));
        let outcomes = dispatcher.dispatch(&payload).await;

        assert!(matches!(outcomes[0].result, Err(WebhookError::Request(_))));
        assert!(outcomes[1].is_success());
    }
}
