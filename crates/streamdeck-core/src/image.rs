//! Image payloads for `setImage`.
//!
//! The Stream Deck application takes images as data URLs:
//! - `data:image/svg+xml;charset=utf8,<svg …>` - inline SVG markup
//! - `data:image/png;base64,<bytes>` - base64-encoded raster data

use base64::Engine;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const SVG_MEDIA_TYPE: &str = "image/svg+xml;charset=utf8";
const BASE64_SUFFIX: &str = ";base64";

/// An image encoded as a data URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageData {
    media_type: String,
    base64: bool,
    data: String,
}

impl ImageData {
    /// Wrap SVG markup.
    pub fn svg(markup: impl Into<String>) -> Self {
        Self {
            media_type: SVG_MEDIA_TYPE.to_string(),
            base64: false,
            data: markup.into(),
        }
    }

    /// Wrap already-encoded PNG bytes.
    pub fn png(bytes: &[u8]) -> Self {
        Self::encoded("image/png", bytes)
    }

    /// Wrap already-encoded bytes of any image media type.
    pub fn encoded(media_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            media_type: media_type.into(),
            base64: true,
            data: STANDARD_NO_PAD.encode(bytes),
        }
    }

    /// The media type, including parameters such as `charset`.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Whether the data part is base64-encoded.
    pub fn is_base64(&self) -> bool {
        self.base64
    }

    /// The data part, exactly as it appears after the comma.
    pub fn data(&self) -> &str {
        &self.data
    }
}

impl fmt::Display for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = if self.base64 { BASE64_SUFFIX } else { "" };
        write!(f, "data:{}{},{}", self.media_type, suffix, self.data)
    }
}

impl FromStr for ImageData {
    type Err = ImageDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix("data:")
            .ok_or_else(|| ImageDataError::MissingScheme(s.to_string()))?;
        let (header, data) = rest.split_once(',').ok_or(ImageDataError::MissingComma)?;

        let (media_type, base64) = match header.strip_suffix(BASE64_SUFFIX) {
            Some(media_type) => (media_type, true),
            None => (header, false),
        };
        if media_type.is_empty() {
            return Err(ImageDataError::EmptyMediaType);
        }

        Ok(Self {
            media_type: media_type.to_string(),
            base64,
            data: data.to_string(),
        })
    }
}

impl TryFrom<String> for ImageData {
    type Error = ImageDataError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ImageData> for String {
    fn from(image: ImageData) -> Self {
        image.to_string()
    }
}

/// Error parsing an image data URL.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ImageDataError {
    #[error("image must be a data: URL, got: {0}")]
    MissingScheme(String),
    #[error("data URL must contain ',' between header and data")]
    MissingComma,
    #[error("data URL media type cannot be empty")]
    EmptyMediaType,
}
