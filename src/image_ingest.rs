// src/image_ingest.rs
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

/// Largest image accepted for inline submission (10MB)
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// Largest accepted `data:` URI request body: base64 of a maximal image plus
/// room for the prefix and the JSON wrapper
pub const MAX_DATA_URI_BODY: usize = (MAX_IMAGE_SIZE + 2) / 3 * 4 + 1024;

const PNG_SIGNATURE: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_SIGNATURE: &[u8] = &[0xFF, 0xD8, 0xFF];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    #[error("Image file is empty")]
    Empty,
    #[error("Image file too large: {0} bytes (max 10MB)")]
    TooLarge(usize),
    #[error("Unsupported image format")]
    UnsupportedFormat,
    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),
}

impl ImageError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Empty => "IMAGE_EMPTY",
            Self::TooLarge(_) => "IMAGE_TOO_LARGE",
            Self::UnsupportedFormat => "IMAGE_WRONG_FORMAT",
            Self::InvalidDataUri(_) => "IMAGE_INVALID_DATA_URI",
        }
    }

    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::Empty => "Please upload a valid image file",
            Self::TooLarge(_) => "Please resize or compress your image and try again",
            Self::UnsupportedFormat => "Please use PNG, JPEG, GIF or WebP",
            Self::InvalidDataUri(_) => "Send the image as a base64 data: URI",
        }
    }
}

/// An uploaded offer image, ready to be attached inline to an analysis
/// request and rendered back as a preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    pub mime_type: &'static str,
    /// Base64 body without the `data:` prefix
    pub data: String,
    pub byte_len: usize,
}

impl ImagePayload {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }
        if bytes.len() > MAX_IMAGE_SIZE {
            error!("Rejected image upload of {} bytes", bytes.len());
            return Err(ImageError::TooLarge(bytes.len()));
        }

        let mime_type = sniff_mime_type(bytes).ok_or(ImageError::UnsupportedFormat)?;
        debug!("Ingested {} image ({} bytes)", mime_type, bytes.len());

        Ok(Self {
            mime_type,
            data: STANDARD.encode(bytes),
            byte_len: bytes.len(),
        })
    }

    /// Accepts what a browser `FileReader.readAsDataURL` produces
    pub fn from_data_uri(uri: &str) -> Result<Self, ImageError> {
        let rest = uri
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| ImageError::InvalidDataUri("missing data: prefix".to_string()))?;

        let (header, body) = rest
            .split_once(',')
            .ok_or_else(|| ImageError::InvalidDataUri("missing ',' separator".to_string()))?;

        if !header.ends_with(";base64") {
            return Err(ImageError::InvalidDataUri(
                "only base64 data URIs are supported".to_string(),
            ));
        }

        let bytes = STANDARD
            .decode(body.trim())
            .map_err(|e| ImageError::InvalidDataUri(e.to_string()))?;

        // The declared media type is not trusted; the header bytes decide
        Self::from_bytes(&bytes)
    }

    pub fn preview_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

fn sniff_mime_type(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(PNG_SIGNATURE) {
        Some("image/png")
    } else if bytes.starts_with(JPEG_SIGNATURE) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}
