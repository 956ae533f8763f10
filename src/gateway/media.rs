//! Media download for URL-based send requests.

use crate::error::FetchError;
use crate::messenger::MediaAttachment;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

/// Downloaded media body.
#[derive(Debug, Clone)]
pub struct FetchedMedia {
    pub bytes: Vec<u8>,
    /// `Content-Type` reported by the origin, without parameters
    pub content_type: Option<String>,
}

/// Download `url`. Non-2xx answers are errors.
pub async fn fetch_media(http: &Client, url: &str) -> Result<FetchedMedia, FetchError> {
    let request_error = |source| FetchError::Request {
        url: url.to_string(),
        source,
    };

    let response = http.get(url).send().await.map_err(request_error)?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty());

    let bytes = response.bytes().await.map_err(request_error)?;
    tracing::debug!("Fetched {} bytes from {}", bytes.len(), url);

    Ok(FetchedMedia {
        bytes: bytes.to_vec(),
        content_type,
    })
}

/// Wrap raw bytes as a base64 media attachment.
pub fn encode_media(mimetype: &str, bytes: &[u8], filename: &str) -> MediaAttachment {
    MediaAttachment {
        mimetype: mimetype.to_string(),
        data: STANDARD.encode(bytes),
        filename: filename.to_string(),
    }
}

/// MIME type and file name for an image, based on what the origin reported.
///
/// Anything that is not a recognised image type is sent as JPEG.
pub fn image_kind(content_type: Option<&str>) -> (&'static str, &'static str) {
    match content_type {
        Some("image/png") => ("image/png", "img.png"),
        Some("image/webp") => ("image/webp", "img.webp"),
        Some("image/gif") => ("image/gif", "img.gif"),
        _ => ("image/jpeg", "img.jpg"),
    }
}
