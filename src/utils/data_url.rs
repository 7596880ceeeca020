use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// A decoded `data:` URL, as produced by the poster form's file pickers.
#[derive(Debug, Clone, PartialEq)]
pub struct DataUrl {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl DataUrl {
    /// Parses a base64 `data:<mime>;base64,<payload>` string. Anything else
    /// (plain-text data URLs included) is rejected.
    pub fn parse(input: &str) -> Option<Self> {
        let rest = input.strip_prefix("data:")?;
        let (content_type, payload) = rest.split_once(";base64,")?;
        if content_type.is_empty() {
            return None;
        }

        let bytes = STANDARD.decode(payload.trim()).ok()?;
        Some(Self {
            content_type: content_type.to_string(),
            bytes,
        })
    }

    /// File extension matching the content type, for blob object names.
    pub fn extension(&self) -> &str {
        match self.content_type.as_str() {
            "image/jpeg" => "jpg",
            "image/svg+xml" => "svg",
            other => other.rsplit('/').next().unwrap_or("bin"),
        }
    }
}
