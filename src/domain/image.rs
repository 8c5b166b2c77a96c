use std::sync::LazyLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MIN_SCALE: f64 = 0.5;
pub const MAX_SCALE: f64 = 3.0;
pub const SCALE_STEP: f64 = 0.25;

pub const PLACEHOLDER_URL: &str = "https://placehold.co/1200x900?text=New+Image";
pub const PLACEHOLDER_ALT: &str = "New image";

static INLINE_PAYLOAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:(image/[A-Za-z0-9.+-]+);base64,").expect("inline payload pattern")
});

/// A displayable image leaf: `{ url, alt, scale? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ImageEntry {
    /// Remote URL or inline `data:image/...;base64,` payload.
    pub url: String,
    pub alt: String,
    /// Display zoom factor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 0.5, max = 3.0))]
    pub scale: Option<f64>,
}

impl ImageEntry {
    pub fn new(url: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alt: alt.into(),
            scale: None,
        }
    }

    /// The entry appended when a series grows.
    pub fn placeholder() -> Self {
        Self::new(PLACEHOLDER_URL, PLACEHOLDER_ALT)
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = Some(clamp_scale(scale));
        self
    }

    pub fn effective_scale(&self) -> f64 {
        self.scale.map(clamp_scale).unwrap_or(1.0)
    }

    pub fn source(&self) -> ImageSource<'_> {
        ImageSource::classify(&self.url)
    }

    pub fn to_value(&self) -> Value {
        // Serializing plain strings and an f64 cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        Self::deserialize(value).ok()
    }
}

pub fn clamp_scale(scale: f64) -> f64 {
    if scale.is_nan() {
        return 1.0;
    }
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

/// Where an image's bytes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource<'a> {
    Remote(&'a str),
    Inline { mime: &'a str, encoded_len: usize },
}

impl<'a> ImageSource<'a> {
    pub fn classify(url: &'a str) -> Self {
        match INLINE_PAYLOAD.captures(url) {
            Some(captures) => {
                let header = captures.get(0).map(|m| m.end()).unwrap_or(0);
                let mime = captures.get(1).map(|m| m.as_str()).unwrap_or("image/*");
                ImageSource::Inline {
                    mime,
                    encoded_len: url.len().saturating_sub(header),
                }
            }
            None => ImageSource::Remote(url),
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, ImageSource::Inline { .. })
    }

    /// Short label for status lines; inline payloads are never echoed.
    pub fn describe(&self) -> String {
        match self {
            ImageSource::Remote(url) => (*url).to_string(),
            ImageSource::Inline { mime, encoded_len } => {
                let decoded = encoded_len / 4 * 3;
                format!("inline {mime} ({})", human_size(decoded as u64))
            }
        }
    }
}

pub(crate) fn human_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;
    if bytes >= MIB {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{} KB", bytes / KIB)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scale_is_clamped_into_range() {
        assert_eq!(ImageEntry::placeholder().with_scale(9.0).scale, Some(MAX_SCALE));
        assert_eq!(ImageEntry::placeholder().with_scale(0.1).scale, Some(MIN_SCALE));
        assert_eq!(ImageEntry::placeholder().effective_scale(), 1.0);
    }

    #[test]
    fn scale_is_omitted_when_unset() {
        let value = ImageEntry::new("https://x/y.png", "y").to_value();
        assert_eq!(value, json!({"url": "https://x/y.png", "alt": "y"}));
        let parsed = ImageEntry::from_value(&json!({"url": "u", "alt": "a", "scale": 1.5}));
        assert_eq!(parsed.and_then(|entry| entry.scale), Some(1.5));
    }

    #[test]
    fn classifies_inline_payloads() {
        let source = ImageSource::classify("data:image/png;base64,AAAAAAAA");
        assert_eq!(
            source,
            ImageSource::Inline {
                mime: "image/png",
                encoded_len: 8
            }
        );
        assert_eq!(source.describe(), "inline image/png (6 B)");
        assert!(!ImageSource::classify("https://example.com/a.jpg").is_inline());
    }
}
