//! Media-type resolution and the upload allow-list.

use log::debug;
use std::path::Path;

use crate::error::{Error, Result};

/// Media types the backend accepts for ingestion.
pub const SUPPORTED_MEDIA_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "image/jpeg",
    "image/png",
    "image/tiff",
    "image/bmp",
];

const OCTET_STREAM: &str = "application/octet-stream";

/// Extension table used when the system mime database has no answer.
const FALLBACK_TYPES: &[(&str, &str)] = &[
    ("pdf", "application/pdf"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("ppt", "application/vnd.ms-powerpoint"),
    (
        "pptx",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    ),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("tiff", "image/tiff"),
    ("bmp", "image/bmp"),
];

/// Guesses the media type of a file from its extension.
/// Unknown extensions resolve to `application/octet-stream`.
pub fn mime_type_for(filename: &str) -> String {
    if let Some(mime) = mime_guess::from_path(filename).first() {
        return mime.essence_str().to_string();
    }

    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    FALLBACK_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| mime.to_string())
        .unwrap_or_else(|| OCTET_STREAM.to_string())
}

/// An immutable allow-list of uploadable media types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTypes {
    allowed: Vec<String>,
}

impl Default for MediaTypes {
    fn default() -> Self {
        Self::new(SUPPORTED_MEDIA_TYPES.iter().copied())
    }
}

impl MediaTypes {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allows(&self, mime_type: &str) -> bool {
        self.allowed.iter().any(|m| m.eq_ignore_ascii_case(mime_type))
    }

    /// Resolves the media type for `filename` and checks it against the list.
    ///
    /// Every candidate the mime database knows for the extension is tried, so
    /// an extension with several registered types is accepted if any of them
    /// is allowed.
    pub fn validate(&self, filename: &str) -> Result<String> {
        let guess = mime_guess::from_path(filename);
        if let Some(mime) = guess.iter().find(|m| self.allows(m.essence_str())) {
            return Ok(mime.essence_str().to_string());
        }

        let mime_type = mime_type_for(filename);
        if self.allows(&mime_type) {
            return Ok(mime_type);
        }

        debug!("Rejecting {}: {} is not an allowed media type", filename, mime_type);
        Err(Error::UnsupportedFileType {
            filename: filename.to_string(),
            mime_type,
        })
    }
}
