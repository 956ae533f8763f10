//! Pairing code storage and rendering.
//!
//! The client emits a new pairing code every time the QR shown by the phone
//! rotates. Only the latest one matters, so the store is a single slot that
//! each new code overwrites.

use crate::error::PairingError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use qrcode::render::svg;
use qrcode::QrCode;
use std::sync::RwLock;

/// Markup served before any pairing code exists.
pub const QR_NOT_READY_HTML: &str = "<h3>🔄 QR Code is not ready yet…</h3>";

/// Pairing code with its rendered image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingCode {
    /// Payload as emitted by the client
    pub raw: String,
    /// `data:` URL of the QR image
    pub image_data_url: String,
    pub received_at: DateTime<Utc>,
}

impl PairingCode {
    /// Render a pairing payload into a displayable code.
    pub fn render(raw: &str) -> Result<Self, PairingError> {
        Ok(Self {
            raw: raw.to_string(),
            image_data_url: render_qr_data_url(raw)?,
            received_at: Utc::now(),
        })
    }
}

/// Single-slot store for the latest pairing code.
#[derive(Debug, Default)]
pub struct PairingStore {
    latest: RwLock<Option<PairingCode>>,
}

impl PairingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current code.
    pub fn set(&self, code: PairingCode) {
        match self.latest.write() {
            Ok(mut slot) => *slot = Some(code),
            Err(poisoned) => *poisoned.into_inner() = Some(code),
        }
    }

    /// Latest code, if one was ever received.
    pub fn latest(&self) -> Option<PairingCode> {
        match self.latest.read() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Forget the current code. The gateway itself never clears the slot;
    /// this lets tests reset a shared store.
    #[cfg(test)]
    pub fn clear(&self) {
        match self.latest.write() {
            Ok(mut slot) => *slot = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }
}

/// Render a payload as an SVG QR code wrapped in a `data:` URL.
pub fn render_qr_data_url(raw: &str) -> Result<String, PairingError> {
    let code = QrCode::new(raw.as_bytes())?;
    let image = code
        .render::<svg::Color>()
        .min_dimensions(300, 300)
        .quiet_zone(true)
        .build();

    Ok(format!(
        "data:image/svg+xml;base64,{}",
        STANDARD.encode(image.as_bytes())
    ))
}

/// Render a payload as a QR code for terminal display.
pub fn render_qr_terminal(raw: &str) -> Result<String, PairingError> {
    let code = QrCode::new(raw.as_bytes())?;
    Ok(code
        .render::<char>()
        .quiet_zone(true)
        .module_dimensions(2, 1)
        .build())
}

/// HTML page for the `/qr` endpoint.
pub fn render_qr_page(code: Option<&PairingCode>) -> String {
    let Some(code) = code else {
        return QR_NOT_READY_HTML.to_string();
    };

    format!(
        r#"<html><body style="text-align:center;margin-top:40px">
  <h2>📲 Scan this QR Code</h2>
  <img src="{}" width="300"/>
  <p><small>Generated {}</small></p>
</body></html>"#,
        code.image_data_url,
        code.received_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_is_base64_svg() {
        let url = render_qr_data_url("2@abcdef,ghijk,lmnop").unwrap();
        let encoded = url
            .strip_prefix("data:image/svg+xml;base64,")
            .expect("svg data url prefix");
        let svg = String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn test_terminal_rendering_is_not_empty() {
        let text = render_qr_terminal("2@abcdef").unwrap();
        assert!(text.lines().count() > 10);
    }

    #[test]
    fn test_store_starts_empty() {
        let store = PairingStore::new();
        assert!(store.latest().is_none());
    }

    #[test]
    fn test_store_keeps_only_latest() {
        let store = PairingStore::new();
        store.set(PairingCode::render("first").unwrap());
        store.set(PairingCode::render("second").unwrap());
        assert_eq!(store.latest().unwrap().raw, "second");

        store.clear();
        assert!(store.latest().is_none());
    }

    #[test]
    fn test_page_placeholder_before_pairing() {
        assert_eq!(render_qr_page(None), QR_NOT_READY_HTML);
    }

    #[test]
    fn test_page_embeds_image() {
        let code = PairingCode::render("2@abcdef").unwrap();
        let page = render_qr_page(Some(&code));
        assert!(page.contains(&format!(r#"<img src="{}""#, code.image_data_url)));
        assert!(page.contains("Scan this QR Code"));
    }
}
