use crate::{Error, Result};
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;

const DEFAULT_MIME: &str = "image/png";

/// Standard alphabet, padding optional.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// An image reference as returned upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    /// Already hosted; used as-is.
    Remote(String),
    /// `data:image/<fmt>;base64,<payload>`; must be re-hosted before storing.
    Embedded { mime_type: String, payload: String },
}

pub fn classify(url: String) -> ImageRef {
    if !url.starts_with("data:image/") {
        return ImageRef::Remote(url);
    }

    let (header, payload) = url.split_once(',').unwrap_or((url.as_str(), ""));
    let mime_type = header
        .trim_start_matches("data:")
        .split(';')
        .next()
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_MIME)
        .to_string();

    ImageRef::Embedded {
        mime_type,
        payload: payload.to_string(),
    }
}

pub fn decode_payload(payload: &str) -> Result<Vec<u8>> {
    if payload.trim().is_empty() {
        return Err(Error::Upstream("Invalid base64 image data".to_string()));
    }
    Ok(decode_base64(payload)?)
}

/// Decode base64 with or without padding, ignoring embedded ASCII whitespace.
pub fn decode_base64(raw: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    let compact: String = raw.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    LENIENT.decode(compact)
}

pub fn extension_for_mime(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/png" => "png",
        other => {
            tracing::warn!("Unrecognized image MIME type {}, storing as png", other);
            "png"
        }
    }
}
