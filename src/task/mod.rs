//! Long-running task protocol: submit a document, then poll its status.
//!
//! - `submit` - upload validation and multipart bodies
//! - `poll` - the fixed-interval polling state machine

mod poll;
mod submit;

pub use poll::{
    DEFAULT_MAX_RETRIES, DEFAULT_POLL_INTERVAL_MS, PollOptions, TaskStatusSource, poll_until_done,
};
#[cfg(test)]
pub use poll::MockTaskStatusSource;
pub use submit::{ADD_DOCUMENT_PATH, CREATE_INDEX_PATH, Upload, build_form, require_task_id};
