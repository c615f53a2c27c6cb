//! HTTP transport: authenticated requests, response envelopes and error
//! classification.

mod classify;
mod client;
pub mod envelope;

pub use classify::{classify_envelope_error, classify_status, classify_transport};
pub use client::HttpClient;
