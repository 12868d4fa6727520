use std::path::Path;

use base64::Engine as _;
use image::ImageFormat;
use serde::{Deserialize, Serialize};

use super::PipelineError;
use crate::config::MAX_UPLOAD_BYTES;

/// MIME types the upload accepts.
pub const ACCEPTED_MIME_TYPES: &[&str] = &["image/png", "image/jpeg", "image/webp"];

/// A screenshot ready to send inline: base64 body plus MIME type.
///
/// Every constructor checks the body is non-empty, decodable and one of the
/// accepted raster formats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    encoded_bytes: String,
    mime_type: String,
}

impl ImagePayload {
    /// Sniff the format from magic bytes and encode.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PipelineError> {
        if bytes.is_empty() {
            return Err(PipelineError::InvalidImage("file is empty".into()));
        }
        let mime_type = sniff_mime(bytes)?;
        Ok(Self {
            encoded_bytes: base64::engine::general_purpose::STANDARD.encode(bytes),
            mime_type: mime_type.to_string(),
        })
    }

    /// Load a screenshot from disk.
    ///
    /// The extension must look like an image and the file must fit the
    /// advertised upload limit; the content itself decides the MIME type.
    pub fn from_path(path: &Path) -> Result<Self, PipelineError> {
        let guessed = mime_guess::from_path(path).first_or_octet_stream();
        if guessed.type_() != mime_guess::mime::IMAGE {
            return Err(PipelineError::InvalidImage(format!(
                "{} is not an image file ({guessed})",
                path.display()
            )));
        }

        let metadata = std::fs::metadata(path).map_err(|e| {
            PipelineError::InvalidImage(format!("cannot read {}: {e}", path.display()))
        })?;
        if metadata.len() > MAX_UPLOAD_BYTES {
            return Err(PipelineError::InvalidImage(format!(
                "{} is {} bytes; the limit is {} MB",
                path.display(),
                metadata.len(),
                MAX_UPLOAD_BYTES / (1024 * 1024)
            )));
        }

        let bytes = std::fs::read(path).map_err(|e| {
            PipelineError::InvalidImage(format!("cannot read {}: {e}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), size = bytes.len(), "Loaded screenshot");
        Self::from_bytes(&bytes)
    }

    /// Parse a `data:<mime>;base64,<body>` URL, as produced by an image preview.
    pub fn from_data_url(url: &str) -> Result<Self, PipelineError> {
        let rest = url
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| PipelineError::InvalidImage("not a data URL".into()))?;
        let (header, body) = rest
            .split_once(',')
            .ok_or_else(|| PipelineError::InvalidImage("data URL has no body".into()))?;
        let declared = header
            .strip_suffix(";base64")
            .ok_or_else(|| PipelineError::InvalidImage("data URL is not base64".into()))?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(body.trim())
            .map_err(|e| PipelineError::InvalidImage(format!("bad base64: {e}")))?;
        let payload = Self::from_bytes(&bytes)?;
        if !declared.is_empty() && !declared.eq_ignore_ascii_case(&payload.mime_type) {
            tracing::debug!(
                declared,
                detected = %payload.mime_type,
                "Data URL MIME differs from content, using detected type"
            );
        }
        Ok(payload)
    }

    pub fn encoded_bytes(&self) -> &str {
        &self.encoded_bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Decoded size in bytes (approximate from the base64 length).
    pub fn approx_size(&self) -> usize {
        self.encoded_bytes.len() / 4 * 3
    }
}

fn sniff_mime(bytes: &[u8]) -> Result<&'static str, PipelineError> {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => Ok("image/png"),
        Ok(ImageFormat::Jpeg) => Ok("image/jpeg"),
        Ok(ImageFormat::WebP) => Ok("image/webp"),
        Ok(other) => Err(PipelineError::InvalidImage(format!(
            "{other:?} images are not supported; use PNG, JPEG or WebP"
        ))),
        Err(_) => Err(PipelineError::InvalidImage(
            "unrecognized image format; use PNG, JPEG or WebP".into(),
        )),
    }
}
