//! Image payloads carried from the image service into the document.

use serde::{Deserialize, Serialize};

/// Raster formats a generated picture can be embedded as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Webp,
}

impl ImageFormat {
    /// Detect the format from the leading magic bytes.
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(ImageFormat::Png)
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            Some(ImageFormat::Gif)
        } else if data.starts_with(b"BM") {
            Some(ImageFormat::Bmp)
        } else if data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            Some(ImageFormat::Webp)
        } else {
            None
        }
    }

    /// File extension used for the media part.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Webp => "webp",
        }
    }

    /// MIME type, also used as the package content type.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Webp => "image/webp",
        }
    }
}

/// A generated picture ready to be embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageData {
    /// Detected format
    pub format: ImageFormat,

    /// Binary data
    #[serde(skip)]
    pub data: Vec<u8>,

    /// Size in bytes
    pub size: usize,
}

impl ImageData {
    /// Wrap image bytes, returning `None` for empty or unrecognized data.
    pub fn from_bytes(data: Vec<u8>) -> Option<Self> {
        let format = ImageFormat::detect(&data)?;
        let size = data.len();
        Some(Self { format, data, size })
    }

    /// MIME type of the payload.
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_detect_formats() {
        assert_eq!(ImageFormat::detect(&PNG_MAGIC), Some(ImageFormat::Png));
        assert_eq!(
            ImageFormat::detect(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::detect(b"GIF89a...."), Some(ImageFormat::Gif));
        assert_eq!(
            ImageFormat::detect(b"RIFF\x00\x00\x00\x00WEBPVP8 "),
            Some(ImageFormat::Webp)
        );
        assert_eq!(ImageFormat::detect(b"<html>"), None);
        assert_eq!(ImageFormat::detect(&[]), None);
    }

    #[test]
    fn test_image_data_from_bytes() {
        let image = ImageData::from_bytes(PNG_MAGIC.to_vec()).unwrap();
        assert_eq!(image.format, ImageFormat::Png);
        assert_eq!(image.size, 8);
        assert_eq!(image.mime_type(), "image/png");

        assert!(ImageData::from_bytes(Vec::new()).is_none());
        assert!(ImageData::from_bytes(b"not an image".to_vec()).is_none());
    }

    #[test]
    fn test_bytes_not_serialized() {
        let image = ImageData::from_bytes(PNG_MAGIC.to_vec()).unwrap();
        let json = serde_json::to_string(&image).unwrap();
        assert!(json.contains("\"format\":\"png\""));
        assert!(!json.contains("data"));
    }
}
