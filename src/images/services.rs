use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;

pub const FALLBACK_MIME: &str = "image/jpeg";

/// Raw photo bytes plus the MIME type the model will be told.
#[derive(Debug, Clone)]
pub struct UploadItem {
    pub body: Bytes,
    pub content_type: String,
}

impl UploadItem {
    /// Keeps a declared `image/*` type, otherwise sniffs the bytes.
    pub fn new(body: Bytes, declared: Option<&str>) -> Self {
        let content_type = resolve_mime(&body, declared);
        Self { body, content_type }
    }
}

pub fn resolve_mime(body: &[u8], declared: Option<&str>) -> String {
    let declared = declared
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
        .filter(|ct| ct.starts_with("image/") && ct.len() > "image/".len());

    match declared.as_deref() {
        Some("image/jpg") => "image/jpeg".to_string(),
        Some(ct) => ct.to_string(),
        None => sniff_mime(body).unwrap_or(FALLBACK_MIME).to_string(),
    }
}

/// Magic-byte detection for the formats phones produce.
pub fn sniff_mime(body: &[u8]) -> Option<&'static str> {
    match body {
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some("image/png"),
        [b'G', b'I', b'F', b'8', ..] => Some("image/gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        [_, _, _, _, b'f', b't', b'y', b'p', brand @ ..] if brand.len() >= 4 => {
            match &brand[..4] {
                b"heic" | b"heix" | b"hevc" | b"hevx" | b"mif1" | b"msf1" => Some("image/heic"),
                b"avif" => Some("image/avif"),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Decodes a base64 photo, accepting a `data:<mime>;base64,` prefix.
/// Returns the bytes and the MIME type named by the data URL, if any.
pub fn decode_base64_image(input: &str) -> Result<(Bytes, Option<String>), base64::DecodeError> {
    let input = input.trim();
    let (mime, payload) = match input.strip_prefix("data:") {
        Some(rest) => match rest.split_once(',') {
            Some((header, payload)) => {
                let mime = header.strip_suffix(";base64").unwrap_or(header);
                let mime = (!mime.is_empty()).then(|| mime.to_string());
                (mime, payload)
            }
            None => (None, rest),
        },
        None => (None, input),
    };

    let cleaned: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD.decode(cleaned)?;
    Ok((Bytes::from(bytes), mime))
}
