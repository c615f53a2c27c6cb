//! Maps raw transport failures onto the crate error taxonomy.
//!
//! This is the only place a failure is classified. Callers above the
//! transport adapter propagate the resulting [`Error`] untouched.

use reqwest::StatusCode;
use serde_json::Value;

use super::envelope::error_text;
use crate::error::{Error, RawResponse};

/// Classifies a response whose HTTP status signals failure.
pub fn classify_status(status: StatusCode, body: String) -> Error {
    let parsed: Option<Value> = serde_json::from_str(&body).ok();
    let field = |name: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get(name))
            .filter(|v| !v.is_null())
            .map(error_text)
    };
    let generic = || format!("Request failed with status code {}", status.as_u16());
    let response = RawResponse {
        status: status.as_u16(),
        body,
    };

    match status {
        // Body content is irrelevant for a rejected credential
        StatusCode::UNAUTHORIZED => Error::Authentication("Invalid API key".to_string()),
        StatusCode::UNPROCESSABLE_ENTITY => Error::Validation {
            message: field("message")
                .or_else(|| field("error"))
                .unwrap_or_else(generic),
            response,
        },
        s => Error::Api {
            status: s.as_u16(),
            message: format!(
                "HTTP {} error: {}",
                s.as_u16(),
                field("error").unwrap_or_else(generic)
            ),
            response,
        },
    }
}

/// Classifies a successful-status response that carried an `error` field.
pub fn classify_envelope_error(status: StatusCode, message: String, body: String) -> Error {
    Error::Api {
        status: status.as_u16(),
        message: format!("API error: {}", message),
        response: RawResponse {
            status: status.as_u16(),
            body,
        },
    }
}

/// Classifies a failure raised by reqwest itself.
pub fn classify_transport(error: reqwest::Error) -> Error {
    if error.is_builder() || error.is_redirect() || error.is_decode() {
        return Error::Unknown(error.to_string());
    }

    if error.is_connect() || error.is_timeout() || error.is_request() || error.is_body() {
        return Error::Network(error);
    }

    Error::Unknown(error.to_string())
}
