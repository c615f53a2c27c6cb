//! Multipart bodies for the submission endpoints.

use reqwest::multipart::{Form, Part};

use crate::error::{Error, Result};
use crate::media::MediaTypes;
use crate::types::SubmissionResult;

pub const CREATE_INDEX_PATH: &str = "/index/create";
pub const ADD_DOCUMENT_PATH: &str = "/index/add-document";

/// A document to upload: raw bytes plus the name used to infer its type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub filename: String,
    pub content: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }
}

/// Validates the upload and builds the submission form.
///
/// Fails with [`Error::UnsupportedFileType`] before anything touches the
/// network when the file type is not on the allow-list.
pub fn build_form(media_types: &MediaTypes, upload: Upload, index_id: Option<&str>) -> Result<Form> {
    let mime_type = media_types.validate(&upload.filename)?;

    let part = Part::bytes(upload.content)
        .file_name(upload.filename)
        .mime_str(&mime_type)
        .map_err(|e| Error::Unknown(format!("Invalid media type {}: {}", mime_type, e)))?;

    let form = Form::new().part("document", part);
    Ok(match index_id {
        Some(index_id) => form.text("index", index_id.to_string()),
        None => form,
    })
}

/// Extracts the task id a submission must carry before polling can begin.
pub fn require_task_id<'a>(endpoint: &str, result: &'a SubmissionResult) -> Result<&'a str> {
    result.task_id().ok_or_else(|| Error::MissingTaskId {
        endpoint: endpoint.to_string(),
    })
}
