//! Image payloads flowing through the workflow.
//!
//! - [`UploadedImage`]: the user's photo (raw bytes + declared MIME type)
//! - [`ImageRef`]: an opaque reference to a rendered image, also the favorites key
//! - [`ImageSource`]: the intake seam the workflow reads the photo through

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::{CoutureError, Result};

static DATA_URI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^data:(?P<mime>[^;,]+);base64,(?P<data>.*)$").expect("static regex")
});

static IMAGE_SUBTYPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"data:image/(\w+);").expect("static regex"));

/// Extension used when a reference carries no recognizable image subtype.
pub const DEFAULT_IMAGE_EXTENSION: &str = "png";

/// The photo uploaded by the user.
///
/// Bytes are shared so that try-on sessions can hold the image without
/// copying it per request.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedImage {
    bytes: Arc<[u8]>,
    mime_type: String,
}

impl UploadedImage {
    /// Creates an image from raw bytes and a declared MIME type.
    ///
    /// # Errors
    ///
    /// Returns an intake error if the payload is empty or the MIME type is
    /// not an `image/*` type.
    pub fn new(bytes: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Result<Self> {
        let bytes = bytes.into();
        let mime_type = mime_type.into();

        if bytes.is_empty() {
            return Err(CoutureError::intake("uploaded file is empty"));
        }
        if !mime_type.starts_with("image/") {
            return Err(CoutureError::intake(format!(
                "unsupported file type '{mime_type}'"
            )));
        }

        Ok(Self {
            bytes: bytes.into(),
            mime_type,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Raw base64 payload, as sent to the generation backend.
    pub fn base64_payload(&self) -> String {
        BASE64_STANDARD.encode(&self.bytes)
    }
}

impl fmt::Debug for UploadedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedImage")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Opaque reference to a rendered image.
///
/// Rendered images are carried as data URIs; the string itself is the
/// identity used by the favorites set.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    /// Builds a data URI reference from a backend inline payload.
    pub fn from_inline(mime_type: &str, base64_data: &str) -> Self {
        Self(format!("data:{mime_type};base64,{base64_data}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Declared MIME type, if the reference is a data URI.
    pub fn mime_type(&self) -> Option<&str> {
        split_data_uri(&self.0).map(|(mime, _)| mime)
    }

    /// File extension derived from the `image/<subtype>` MIME prefix.
    pub fn extension(&self) -> &str {
        IMAGE_SUBTYPE
            .captures(&self.0)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .unwrap_or(DEFAULT_IMAGE_EXTENSION)
    }

    /// Decodes the embedded image bytes.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the reference is not a base64 data URI.
    pub fn decode(&self) -> Result<Vec<u8>> {
        let (_, data) = split_data_uri(&self.0).ok_or_else(|| {
            CoutureError::validation("image reference is not a base64 data URI")
        })?;
        Ok(BASE64_STANDARD.decode(data)?)
    }

    /// Short, log-friendly form of the reference.
    pub fn short(&self) -> String {
        const PREFIX: usize = 48;
        if self.0.len() <= PREFIX {
            self.0.clone()
        } else {
            let cut = (0..=PREFIX)
                .rev()
                .find(|i| self.0.is_char_boundary(*i))
                .unwrap_or(0);
            format!("{}… ({} bytes)", &self.0[..cut], self.0.len())
        }
    }
}

impl fmt::Debug for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImageRef({})", self.short())
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ImageRef {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ImageRef {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

fn split_data_uri(uri: &str) -> Option<(&str, &str)> {
    let caps = DATA_URI.captures(uri)?;
    Some((caps.name("mime")?.as_str(), caps.name("data")?.as_str()))
}

/// Where the workflow reads the user's photo from.
///
/// Reading is a suspension point; implementations report unreadable input
/// as [`CoutureError::Intake`].
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn read_image(&self) -> Result<UploadedImage>;
}

#[async_trait]
impl ImageSource for UploadedImage {
    async fn read_image(&self) -> Result<UploadedImage> {
        Ok(self.clone())
    }
}
