//! Typed request and response payloads for the REST backend.
//!
//! Payloads the backend is known to extend carry an `extra` map so that
//! server-defined fields survive a round trip through the client.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Server-defined fields not modelled explicitly.
pub type Extra = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub document_count: Option<u64>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Documents belonging to one index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentList {
    #[serde(default)]
    pub documents: Vec<Document>,
    pub index: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Lifecycle state of a server-side task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Pending,
    InProgress,
    Completed,
    Failed,
    /// A state this client does not know about; treated as non-terminal.
    #[serde(other)]
    Unknown,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Failed)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskState::Pending => write!(f, "pending"),
            TaskState::InProgress => write!(f, "in_progress"),
            TaskState::Completed => write!(f, "completed"),
            TaskState::Failed => write!(f, "failed"),
            TaskState::Unknown => write!(f, "unknown"),
        }
    }
}

/// Payload of `GET /create-index/task-status/<id>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub status: TaskState,
    #[serde(default, deserialize_with = "opaque_id")]
    pub task_id: Option<String>,
    #[serde(default, deserialize_with = "opaque_id")]
    pub index_id: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl TaskStatus {
    pub fn new(status: TaskState) -> Self {
        Self {
            status,
            task_id: None,
            index_id: None,
            extra: Extra::new(),
        }
    }
}

/// Returned by `POST /index/create` and `POST /index/add-document`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionResult {
    #[serde(default)]
    pub message: String,
    #[serde(default, deserialize_with = "opaque_id")]
    pub task_id: Option<String>,
    /// Where the backend says the task status can be checked.
    #[serde(default)]
    pub check_status: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl SubmissionResult {
    /// The task id, if the backend issued a usable one.
    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref().filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrieveResponse {
    #[serde(default)]
    pub results: Vec<Value>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<Value>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteDocumentResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// An ad-hoc index built from inline context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstantRag {
    pub message: String,
    pub id: String,
    pub query_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub id: String,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstantRagAnswer {
    pub uuid: String,
    pub total_tokens: u64,
    pub answer: String,
    #[serde(default)]
    pub source_documents: Vec<SourceDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Webhook {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(deserialize_with = "flag")]
    pub enabled: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Envelope of `POST /webhooks` and `POST /webhooks/update`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct WebhookEnvelope {
    pub webhook: Webhook,
}

/// Accepts string or numeric ids; anything else is treated as absent.
fn opaque_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// The backend sends `enabled` as `"true"`/`"false"`, sometimes as a bool.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "invalid enabled flag: {}",
                other
            ))),
        },
        Value::Number(n) => Ok(n.as_i64().unwrap_or_default() != 0),
        other => Err(serde::de::Error::custom(format!(
            "invalid enabled flag: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_state_parsing() {
        let status: TaskStatus = serde_json::from_value(json!({
            "status": "in_progress",
            "task_id": "t-1",
            "progress": 40
        }))
        .unwrap();

        assert_eq!(status.status, TaskState::InProgress);
        assert!(!status.status.is_terminal());
        assert_eq!(status.task_id.as_deref(), Some("t-1"));
        assert_eq!(status.extra.get("progress"), Some(&json!(40)));
    }

    #[test]
    fn test_task_state_unknown_value_is_not_terminal() {
        let status: TaskStatus = serde_json::from_value(json!({"status": "queued"})).unwrap();
        assert_eq!(status.status, TaskState::Unknown);
        assert!(!status.status.is_terminal());
    }

    #[test]
    fn test_terminal_states() {
        assert!(TaskState::Completed.is_terminal());
        assert!(TaskState::Failed.is_terminal());
        assert!(!TaskState::Pending.is_terminal());
    }

    #[test]
    fn test_submission_result_task_id() {
        let result: SubmissionResult = serde_json::from_value(json!({
            "message": "Task queued",
            "task_id": "t-1",
            "check_status": "/create-index/task-status/t-1"
        }))
        .unwrap();
        assert_eq!(result.task_id(), Some("t-1"));

        let numeric: SubmissionResult =
            serde_json::from_value(json!({"message": "ok", "task_id": 42})).unwrap();
        assert_eq!(numeric.task_id(), Some("42"));

        let empty: SubmissionResult =
            serde_json::from_value(json!({"message": "ok", "task_id": ""})).unwrap();
        assert_eq!(empty.task_id(), None);

        let missing: SubmissionResult = serde_json::from_value(json!({"message": "ok"})).unwrap();
        assert_eq!(missing.task_id(), None);
    }

    #[test]
    fn test_webhook_enabled_flag() {
        let hook: Webhook = serde_json::from_value(json!({
            "id": "w-1",
            "name": "ingest",
            "enabled": "true",
            "created_at": "2024-01-01",
            "updated_at": "2024-01-02"
        }))
        .unwrap();
        assert!(hook.enabled);
        assert_eq!(hook.url, None);

        let hook: Webhook = serde_json::from_value(json!({
            "id": "w-1",
            "name": "ingest",
            "enabled": false,
            "created_at": "2024-01-01",
            "updated_at": "2024-01-02"
        }))
        .unwrap();
        assert!(!hook.enabled);
    }

    #[test]
    fn test_document_list_keeps_extra_fields() {
        let list: DocumentList = serde_json::from_value(json!({
            "index": "idx-1",
            "documents": [{"id": "d-1", "filename": "a.pdf"}],
            "total": 1
        }))
        .unwrap();
        assert_eq!(list.documents.len(), 1);
        assert_eq!(list.documents[0].filename, "a.pdf");
        assert_eq!(list.extra.get("total"), Some(&json!(1)));
    }
}
