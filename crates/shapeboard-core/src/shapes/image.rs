//! Embedded raster image shape.

use super::ShapeGeometry;
use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::Rect;
use serde::{Deserialize, Serialize};

/// Encoding of the embedded image payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
    Gif,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Gif => "image/gif",
        }
    }

    /// Detect format from a MIME type.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime.to_ascii_lowercase().as_str() {
            "image/png" => Some(ImageFormat::Png),
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            "image/webp" => Some(ImageFormat::WebP),
            "image/gif" => Some(ImageFormat::Gif),
            _ => None,
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        if data.starts_with(b"GIF8") {
            return Some(ImageFormat::Gif);
        }
        // RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }
        None
    }
}

/// An image anchored at its top-left corner.
///
/// The pixels travel inside the record as a `data:` URL; decoding them is up to
/// the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub width: f64,
    pub height: f64,
    #[serde(rename = "dataURL", default)]
    pub data_url: String,
}

impl Image {
    pub fn new(width: f64, height: f64, data_url: impl Into<String>) -> Self {
        Self {
            width,
            height,
            data_url: data_url.into(),
        }
    }

    /// Build a `data:` URL from raw bytes, sniffing the format.
    pub fn data_url_from_bytes(data: &[u8]) -> Option<String> {
        let format = ImageFormat::from_magic_bytes(data)?;
        Some(format!(
            "data:{};base64,{}",
            format.mime_type(),
            STANDARD.encode(data)
        ))
    }

    /// Decode the base64 payload of the data URL.
    pub fn data(&self) -> Option<Vec<u8>> {
        let (header, payload) = self.data_url.strip_prefix("data:")?.split_once(',')?;
        if !header.ends_with(";base64") {
            return None;
        }
        STANDARD.decode(payload.trim()).ok()
    }

    /// Format declared by the data URL, falling back to sniffing the payload.
    pub fn format(&self) -> Option<ImageFormat> {
        let declared = self
            .data_url
            .strip_prefix("data:")
            .and_then(|rest| rest.split([';', ',']).next())
            .and_then(ImageFormat::from_mime_type);
        declared.or_else(|| self.data().and_then(|bytes| ImageFormat::from_magic_bytes(&bytes)))
    }

    /// Scale to fit within max dimensions while preserving aspect ratio.
    pub fn fit_within(&mut self, max_width: f64, max_height: f64) {
        if self.width <= 0.0 || self.height <= 0.0 {
            return;
        }
        let aspect = self.width / self.height;
        if aspect > max_width / max_height {
            self.width = max_width;
            self.height = max_width / aspect;
        } else {
            self.height = max_height;
            self.width = max_height * aspect;
        }
    }
}

impl ShapeGeometry for Image {
    fn local_bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height).abs()
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.width *= sx;
        self.height *= sy;
    }
}
