//! Shared types for messaging client implementations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Domain appended to a phone number to address a personal chat.
pub const CONTACT_DOMAIN: &str = "@c.us";

/// Sender used by the status/stories feed.
pub const STATUS_BROADCAST: &str = "status@broadcast";

/// Suffix carried by group chat addresses.
pub const GROUP_SUFFIX: &str = "@g.us";

/// Build the chat address for a phone number.
pub fn chat_id_for(phone: &str) -> String {
    format!("{}{}", phone, CONTACT_DOMAIN)
}

/// Message received by the account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundMessage {
    /// Sender chat address (e.g. `201234567890@c.us`)
    pub from: String,
    #[serde(default)]
    pub body: String,
    /// Unix timestamp in seconds
    #[serde(default)]
    pub timestamp: i64,
    /// Message type as reported by the client (`chat`, `image`, ...)
    #[serde(rename = "type", default = "default_message_type")]
    pub kind: String,
    /// Client-assigned message id
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub from_me: bool,
}

fn default_message_type() -> String {
    "chat".to_string()
}

/// Descriptor of an established session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    /// Address of the logged-in account
    #[serde(default)]
    pub wid: String,
    #[serde(default)]
    pub pushname: String,
    #[serde(default)]
    pub platform: String,
}

/// Event emitted by a messaging client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum ClientEvent {
    /// A new pairing code is available for scanning.
    Pairing { code: String },
    /// The session is established.
    Ready {
        #[serde(default)]
        session: Option<SessionInfo>,
    },
    /// A message arrived.
    Message(InboundMessage),
}

/// Media payload, base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaAttachment {
    pub mimetype: String,
    pub data: String,
    pub filename: String,
}

/// List type tag used for single-select lists.
pub const SINGLE_SELECT_LIST: u8 = 1;

/// Structured list message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMessage {
    pub button_text: String,
    pub description: String,
    /// Sections exactly as the caller sent them
    pub sections: Vec<Value>,
    pub list_type: u8,
}

/// Quick-reply button payload. Absent fields are left out.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickReplyButton {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_text: Option<Value>,
}

/// Template button with its 1-based position.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateButton {
    pub index: usize,
    pub quick_reply_button: QuickReplyButton,
}

/// Text with up to three quick-reply buttons.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateButtonsMessage {
    pub text: String,
    pub template_buttons: Vec<TemplateButton>,
}

/// Legacy button message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ButtonsMessage {
    pub body: String,
    /// Buttons exactly as the caller sent them
    pub buttons: Vec<Value>,
    pub title: String,
    pub footer: String,
}

/// Content of an outbound message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum OutgoingContent {
    Text(String),
    Media(MediaAttachment),
    List(ListMessage),
    TemplateButtons(TemplateButtonsMessage),
    Buttons(ButtonsMessage),
}

impl OutgoingContent {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            OutgoingContent::Text(_) => "text",
            OutgoingContent::Media(_) => "media",
            OutgoingContent::List(_) => "list",
            OutgoingContent::TemplateButtons(_) => "template_buttons",
            OutgoingContent::Buttons(_) => "buttons",
        }
    }
}

/// Per-send options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SendOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl SendOptions {
    /// Options carrying a caption.
    pub fn with_caption(caption: Option<String>) -> Self {
        Self { caption }
    }
}

/// Acknowledgement of a sent message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    pub message_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_id_for_appends_contact_domain() {
        assert_eq!(chat_id_for("201234567890"), "201234567890@c.us");
    }

    #[test]
    fn test_client_event_from_json_lines() {
        let event: ClientEvent = serde_json::from_str(
            r#"{"event":"message","from":"1@c.us","body":"hi","timestamp":5,"type":"chat","id":"A1","fromMe":false}"#,
        )
        .unwrap();
        let ClientEvent::Message(msg) = event else {
            panic!("expected message event");
        };
        assert_eq!(msg.from, "1@c.us");
        assert_eq!(msg.kind, "chat");
        assert_eq!(msg.id, "A1");

        let event: ClientEvent = serde_json::from_str(r#"{"event":"ready"}"#).unwrap();
        assert_eq!(event, ClientEvent::Ready { session: None });

        let event: ClientEvent =
            serde_json::from_str(r#"{"event":"pairing","code":"2@abc"}"#).unwrap();
        assert_eq!(
            event,
            ClientEvent::Pairing {
                code: "2@abc".to_string()
            }
        );
    }

    #[test]
    fn test_template_buttons_serialize_camel_case() {
        let message = TemplateButtonsMessage {
            text: "Pick one".to_string(),
            template_buttons: vec![TemplateButton {
                index: 1,
                quick_reply_button: QuickReplyButton {
                    id: Some(Value::from("yes")),
                    display_text: Some(Value::from("Yes")),
                },
            }],
        };
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["templateButtons"][0]["index"], 1);
        assert_eq!(
            value["templateButtons"][0]["quickReplyButton"]["displayText"],
            "Yes"
        );
    }

    #[test]
    fn test_quick_reply_button_omits_absent_fields() {
        let button = QuickReplyButton {
            id: Some(Value::from(7)),
            display_text: None,
        };
        assert_eq!(
            serde_json::to_value(&button).unwrap(),
            serde_json::json!({"id": 7})
        );
    }
}
