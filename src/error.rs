//! Error taxonomy for every failure the client can report.
//!
//! Transport failures are classified once, in [`crate::http`], and then
//! travel unchanged through submission, polling and resource operations.

use thiserror::Error;

use crate::types::TaskStatus;

/// Human-readable list used in unsupported-file messages.
pub const SUPPORTED_TYPES_HINT: &str = "PDF, DOC, DOCX, PPT, PPTX, JPG, PNG, TIFF, BMP";

/// The raw HTTP response behind an API error, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Error, Debug)]
pub enum Error {
    /// The backend rejected the credential (HTTP 401).
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The backend rejected the request payload (HTTP 422).
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        response: RawResponse,
    },

    /// Any other HTTP error status, or an `error` field in the response body.
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        response: RawResponse,
    },

    /// No HTTP response was received at all.
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("An unknown error occurred: {0}")]
    Unknown(String),

    /// Rejected locally, before any request was made.
    #[error("Unsupported file type: {mime_type}. Supported types are: {}", SUPPORTED_TYPES_HINT)]
    UnsupportedFileType { filename: String, mime_type: String },

    #[error("Submission response from {endpoint} did not contain a task id")]
    MissingTaskId { endpoint: String },

    /// An id that cannot stand as a single URL path segment.
    #[error("Invalid task id {task_id:?}")]
    InvalidTaskId { task_id: String },

    /// The server reported the task as failed.
    #[error("Task {task_id} failed with status: {}", .status.status)]
    TaskFailed { task_id: String, status: TaskStatus },

    /// The client gave up waiting for a terminal status.
    #[error("Maximum retries ({max_retries}) reached while polling task {task_id}")]
    RetriesExhausted { task_id: String, max_retries: u32 },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error belongs to the general API error family
    /// (plain API errors, validation errors and network errors).
    pub fn is_api_error(&self) -> bool {
        matches!(
            self,
            Error::Api { .. } | Error::Validation { .. } | Error::Network(_)
        )
    }

    /// The HTTP status that produced this error, when one was received.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Authentication(_) => Some(401),
            Error::Validation { response, .. } => Some(response.status),
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The raw response kept for diagnostics, if any.
    pub fn response(&self) -> Option<&RawResponse> {
        match self {
            Error::Validation { response, .. } | Error::Api { response, .. } => Some(response),
            _ => None,
        }
    }
}
