//! Send endpoints.
//!
//! Every endpoint parses its body, validates it, and performs exactly one
//! client send. Bodies that fail to parse or validate are answered with `400`
//! and the endpoint's usage text before the client is involved.

use super::media::{encode_media, fetch_media, image_kind};
use super::AppState;
use crate::error::GatewayError;
use crate::messenger::{
    ButtonsMessage, ListMessage, OutgoingContent, QuickReplyButton, SendOptions, TemplateButton,
    TemplateButtonsMessage, SINGLE_SELECT_LIST,
};
use axum::body::Bytes;
use axum::extract::State;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Default description of a list message.
pub const DEFAULT_LIST_DESCRIPTION: &str = "اختر من القائمة";

/// Default button label of a list message.
pub const DEFAULT_LIST_BUTTON_TEXT: &str = "اختر";

/// Maximum number of quick-reply buttons per message.
pub const MAX_REPLY_BUTTONS: usize = 3;

const FAILED: &str = "Failed";

/// A send request body.
pub trait SendRequest: DeserializeOwned {
    /// Request with every required field checked.
    type Valid;

    /// Reply text for invalid bodies.
    const USAGE: &'static str;

    /// Check required fields, `None` when any is missing or empty.
    fn validate(self) -> Option<Self::Valid>;

    /// Parse and validate a raw body.
    fn parse(body: &[u8]) -> Result<Self::Valid, GatewayError> {
        serde_json::from_slice::<Self>(body)
            .ok()
            .and_then(Self::validate)
            .ok_or(GatewayError::Validation(Self::USAGE))
    }
}

/// Phone number given as a JSON string or integer.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PhoneValue {
    String(String),
    Integer(u64),
}

impl PhoneValue {
    /// Phone as text, `None` when empty. Strings are used verbatim.
    fn into_phone(self) -> Option<String> {
        match self {
            PhoneValue::String(s) => non_empty(Some(s)),
            PhoneValue::Integer(0) => None,
            PhoneValue::Integer(i) => Some(i.to_string()),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn phone(value: Option<PhoneValue>) -> Option<String> {
    value.and_then(PhoneValue::into_phone)
}

// ============================================================================
// Request Bodies
// ============================================================================

/// `POST /api/send-text`
#[derive(Debug, Deserialize)]
pub struct SendTextRequest {
    phone: Option<PhoneValue>,
    message: Option<String>,
}

impl SendRequest for SendTextRequest {
    type Valid = (String, String);
    const USAGE: &'static str = "phone / message?";

    fn validate(self) -> Option<Self::Valid> {
        Some((phone(self.phone)?, non_empty(self.message)?))
    }
}

/// `POST /api/send-image-url`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendImageUrlRequest {
    phone: Option<PhoneValue>,
    image_url: Option<String>,
    caption: Option<String>,
}

impl SendRequest for SendImageUrlRequest {
    type Valid = (String, String, String);
    const USAGE: &'static str = "phone / imageUrl?";

    fn validate(self) -> Option<Self::Valid> {
        Some((
            phone(self.phone)?,
            non_empty(self.image_url)?,
            self.caption.unwrap_or_default(),
        ))
    }
}

/// `POST /api/send-list`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRequest {
    phone: Option<PhoneValue>,
    sections: Option<Vec<Value>>,
    description: Option<String>,
    button_text: Option<String>,
}

impl SendRequest for ListRequest {
    type Valid = (String, ListMessage);
    const USAGE: &'static str = "phone / sections?";

    fn validate(self) -> Option<Self::Valid> {
        let phone = phone(self.phone)?;
        let message = ListMessage {
            button_text: self
                .button_text
                .unwrap_or_else(|| DEFAULT_LIST_BUTTON_TEXT.to_string()),
            description: self
                .description
                .unwrap_or_else(|| DEFAULT_LIST_DESCRIPTION.to_string()),
            sections: self.sections?,
            list_type: SINGLE_SELECT_LIST,
        };
        Some((phone, message))
    }
}

/// `POST /api/send-reply-buttons`
#[derive(Debug, Deserialize)]
pub struct ReplyButtonsRequest {
    phone: Option<PhoneValue>,
    text: Option<String>,
    buttons: Option<Vec<Value>>,
}

impl SendRequest for ReplyButtonsRequest {
    type Valid = (String, TemplateButtonsMessage);
    const USAGE: &'static str = "payload?";

    fn validate(self) -> Option<Self::Valid> {
        let phone = phone(self.phone)?;
        let text = non_empty(self.text)?;
        let template_buttons = self
            .buttons?
            .into_iter()
            .take(MAX_REPLY_BUTTONS)
            .enumerate()
            .map(|(i, b)| TemplateButton {
                index: i + 1,
                quick_reply_button: QuickReplyButton {
                    id: b.get("id").cloned(),
                    display_text: b.get("displayText").cloned(),
                },
            })
            .collect();
        Some((
            phone,
            TemplateButtonsMessage {
                text,
                template_buttons,
            },
        ))
    }
}

/// `POST /api/send-buttons`
#[derive(Debug, Deserialize)]
pub struct LegacyButtonsRequest {
    phone: Option<PhoneValue>,
    message: Option<String>,
    buttons: Option<Vec<Value>>,
    title: Option<String>,
    footer: Option<String>,
}

impl SendRequest for LegacyButtonsRequest {
    type Valid = (String, ButtonsMessage);
    const USAGE: &'static str = "bad payload";

    fn validate(self) -> Option<Self::Valid> {
        Some((
            phone(self.phone)?,
            ButtonsMessage {
                body: non_empty(self.message)?,
                buttons: self.buttons?,
                title: self.title.unwrap_or_default(),
                footer: self.footer.unwrap_or_default(),
            },
        ))
    }
}

/// `POST /api/send-media-url`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaUrlRequest {
    phone: Option<PhoneValue>,
    media_url: Option<String>,
    mime_type: Option<String>,
    file_name: Option<String>,
    caption: Option<String>,
}

/// Validated media request.
#[derive(Debug)]
pub struct ValidMediaUrl {
    pub phone: String,
    pub media_url: String,
    pub mime_type: String,
    pub file_name: String,
    pub caption: Option<String>,
}

impl SendRequest for MediaUrlRequest {
    type Valid = ValidMediaUrl;
    const USAGE: &'static str = "Missing phone, mediaUrl, mimeType, or fileName";

    fn validate(self) -> Option<Self::Valid> {
        Some(ValidMediaUrl {
            phone: phone(self.phone)?,
            media_url: non_empty(self.media_url)?,
            mime_type: non_empty(self.mime_type)?,
            file_name: non_empty(self.file_name)?,
            caption: self.caption,
        })
    }
}

// ============================================================================
// Handlers
// ============================================================================

fn send_failed(reply: &'static str) -> impl FnOnce(crate::error::ClientError) -> GatewayError {
    move |source| GatewayError::Send { reply, source }
}

fn fetch_failed(reply: &'static str) -> impl FnOnce(crate::error::FetchError) -> GatewayError {
    move |source| GatewayError::Fetch { reply, source }
}

pub(super) async fn send_text(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<&'static str, GatewayError> {
    let (phone, message) = SendTextRequest::parse(&body)?;

    state
        .send(&phone, OutgoingContent::Text(message), SendOptions::default())
        .await
        .map_err(send_failed(FAILED))?;

    Ok("Text sent")
}

pub(super) async fn send_image_url(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<&'static str, GatewayError> {
    let (phone, image_url, caption) = SendImageUrlRequest::parse(&body)?;

    let fetched = fetch_media(&state.http, &image_url)
        .await
        .map_err(fetch_failed(FAILED))?;
    let (mimetype, filename) = image_kind(fetched.content_type.as_deref());
    let media = encode_media(mimetype, &fetched.bytes, filename);

    state
        .send(
            &phone,
            OutgoingContent::Media(media),
            SendOptions::with_caption(Some(caption)),
        )
        .await
        .map_err(send_failed(FAILED))?;

    Ok("Image sent")
}

pub(super) async fn send_list(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<&'static str, GatewayError> {
    let (phone, list) = ListRequest::parse(&body)?;

    state
        .send(&phone, OutgoingContent::List(list), SendOptions::default())
        .await
        .map_err(send_failed(FAILED))?;

    Ok("List sent")
}

pub(super) async fn send_reply_buttons(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<&'static str, GatewayError> {
    let (phone, message) = ReplyButtonsRequest::parse(&body)?;

    state
        .send(
            &phone,
            OutgoingContent::TemplateButtons(message),
            SendOptions::default(),
        )
        .await
        .map_err(send_failed(FAILED))?;

    Ok("Reply buttons sent")
}

pub(super) async fn send_buttons(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<&'static str, GatewayError> {
    let (phone, message) = LegacyButtonsRequest::parse(&body)?;

    state
        .send(&phone, OutgoingContent::Buttons(message), SendOptions::default())
        .await
        .map_err(send_failed(FAILED))?;

    Ok("Legacy buttons sent")
}

pub(super) async fn send_media_url(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<&'static str, GatewayError> {
    const MEDIA_FAILED: &str = "Failed to send media";
    let request = MediaUrlRequest::parse(&body)?;

    let fetched = fetch_media(&state.http, &request.media_url)
        .await
        .map_err(fetch_failed(MEDIA_FAILED))?;
    let media = encode_media(&request.mime_type, &fetched.bytes, &request.file_name);

    state
        .send(
            &request.phone,
            OutgoingContent::Media(media),
            SendOptions::with_caption(request.caption),
        )
        .await
        .map_err(send_failed(MEDIA_FAILED))?;

    Ok("Media sent")
}
