//! Image shape. Pixels are resolved by the painter from the source key.

use serde::{Deserialize, Serialize};

/// Image format of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }
}

/// Reference to already-loaded image data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSource {
    /// Lookup key understood by the painter (URL, path or cache id).
    pub key: String,
    pub natural_width: f64,
    pub natural_height: f64,
    pub format: Option<ImageFormat>,
}

impl ImageSource {
    /// Create a source; the format is guessed from the key's extension.
    pub fn new(key: impl Into<String>, natural_width: f64, natural_height: f64) -> Self {
        let key = key.into();
        let format = key
            .rsplit_once('.')
            .and_then(|(_, ext)| ImageFormat::from_extension(ext));
        Self {
            key,
            natural_width,
            natural_height,
            format,
        }
    }
}

/// An image shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub source: ImageSource,
}

impl Image {
    pub fn new(source: ImageSource) -> Self {
        Self { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_key() {
        assert_eq!(ImageSource::new("a/b/photo.JPG", 1.0, 1.0).format, Some(ImageFormat::Jpeg));
        assert_eq!(ImageSource::new("cache-17", 1.0, 1.0).format, None);
        assert_eq!(ImageFormat::WebP.mime_type(), "image/webp");
    }
}
