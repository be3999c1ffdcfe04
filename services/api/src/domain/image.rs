//! Inline image payloads (`data:image/<ext>;base64,<payload>`).

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Raw image bytes decoded from a data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub bytes: Vec<u8>,
    /// File extension taken from the media subtype (`jpeg` becomes `jpg`).
    pub extension: String,
}

impl DecodedImage {
    pub fn from_data_uri(value: &str) -> Result<Self, String> {
        let rest = value
            .strip_prefix("data:image/")
            .ok_or_else(|| "image must be a data:image/...;base64 URI".to_owned())?;
        let (subtype, payload) = rest
            .split_once(";base64,")
            .ok_or_else(|| "image must be base64 encoded".to_owned())?;
        let subtype = subtype.to_ascii_lowercase();
        if subtype.is_empty() || !subtype.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err("unsupported image type".to_owned());
        }
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|_| "image payload is not valid base64".to_owned())?;
        if bytes.is_empty() {
            return Err("image payload is empty".to_owned());
        }
        let extension = match subtype.as_str() {
            "jpeg" => "jpg".to_owned(),
            _ => subtype,
        };
        Ok(Self { bytes, extension })
    }
}
