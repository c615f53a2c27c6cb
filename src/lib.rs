//! Client for the iQ Suite document-indexing and RAG service.
//!
//! Document ingestion runs asynchronously on the server: a submission returns
//! a task id which is then polled at a fixed interval until it completes,
//! fails, or the caller's retry ceiling is reached.

pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod http;
pub mod media;
pub mod task;
pub mod types;

pub use client::IqSuiteClient;
pub use client::WebhookSpec;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use media::MediaTypes;
pub use task::{PollOptions, Upload};
pub use types::{SubmissionResult, TaskState, TaskStatus};
