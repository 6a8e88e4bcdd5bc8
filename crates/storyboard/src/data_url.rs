/// Data URL handling for generated images
///
/// Images move through the system as `data:<mime>;base64,<payload>`
/// strings. Decoding is lenient by design: anything that does not look
/// like a base64 image data URL yields `None` so callers can skip the
/// entry instead of aborting.

use base64::Engine as _;

/// A decoded image payload with its declared media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DecodedImage {
    /// File extension for the declared media type, if recognized.
    pub fn extension(&self) -> Option<&'static str> {
        extension_for_mime(&self.mime)
    }
}

/// Decode a base64 image data URL. Returns `None` when the string has
/// fewer than two comma-separated segments, an unrecognized header, or
/// an invalid base64 payload.
pub fn decode(data_url: &str) -> Option<DecodedImage> {
    let (header, payload) = data_url.split_once(',')?;
    let mime = header
        .strip_prefix("data:")?
        .strip_suffix(";base64")?
        .to_string();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .ok()?;
    Some(DecodedImage { mime, bytes })
}

/// Split a data URL into (mime, raw base64 payload) without decoding.
/// Used when the payload is re-sent to the model as inline data.
pub fn split(data_url: &str) -> Option<(String, String)> {
    let (header, payload) = data_url.split_once(',')?;
    let mime = header.strip_prefix("data:")?.strip_suffix(";base64")?;
    Some((mime.to_string(), payload.to_string()))
}

/// Build a data URL from a media type and raw bytes.
pub fn encode(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{mime};base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    match mime {
        "image/png" => Some("png"),
        "image/jpeg" => Some("jpg"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_round_trip() {
        let url = encode("image/png", b"not-a-real-png");
        let decoded = decode(&url).unwrap();
        assert_eq!(decoded.mime, "image/png");
        assert_eq!(decoded.bytes, b"not-a-real-png");
        assert_eq!(decoded.extension(), Some("png"));
    }

    #[test]
    fn test_decode_rejects_malformed_input() {
        assert!(decode("data:image/png;base64").is_none()); // no comma
        assert!(decode("image/png;base64,AAAA").is_none()); // missing scheme
        assert!(decode("data:image/png,AAAA").is_none()); // not base64-tagged
        assert!(decode("data:image/png;base64,@@@").is_none()); // bad payload
    }

    #[test]
    fn test_split_keeps_payload_verbatim() {
        let (mime, payload) = split("data:image/jpeg;base64,aGVsbG8=").unwrap();
        assert_eq!(mime, "image/jpeg");
        assert_eq!(payload, "aGVsbG8=");
    }

    #[test]
    fn test_unknown_extension() {
        let url = encode("image/tiff", b"x");
        assert_eq!(decode(&url).unwrap().extension(), None);
    }
}
