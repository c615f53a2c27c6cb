//! The typed client for the indexing service.
//!
//! - `index` - indexes, documents, ingestion tasks, retrieval and instant RAG
//! - `webhooks` - webhook registrations

mod index;
mod webhooks;

pub use webhooks::WebhookSpec;

use async_trait::async_trait;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::media::MediaTypes;
use crate::task::{self, PollOptions, TaskStatusSource};
use crate::types::{TaskStatus, User};

/// Client for the document-indexing and RAG service.
///
/// Holds only immutable configuration, so clones are cheap and calls may be
/// issued concurrently.
#[derive(Clone, Debug)]
pub struct IqSuiteClient {
    http: HttpClient,
    media_types: MediaTypes,
}

impl IqSuiteClient {
    #[tracing::instrument(skip(config), fields(base_url = %config.normalized_base_url()))]
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = config.build_http_client()?;
        Ok(Self {
            http: HttpClient::new(client, config.normalized_base_url()),
            media_types: config.media_types,
        })
    }

    /// Creates a client with default settings for the given API key.
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self> {
        Self::new(ClientConfig::new(api_key))
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    pub fn media_types(&self) -> &MediaTypes {
        &self.media_types
    }

    /// Fetches the account behind the API key.
    #[tracing::instrument(skip(self))]
    pub async fn get_user(&self) -> Result<User> {
        self.http.get("/user").await
    }

    /// Fetches the current status of an ingestion task.
    #[tracing::instrument(skip(self))]
    pub async fn get_task_status(&self, task_id: &str) -> Result<TaskStatus> {
        if matches!(task_id, "" | "." | "..") {
            return Err(Error::InvalidTaskId {
                task_id: task_id.to_string(),
            });
        }
        self.http
            .get_segment("/create-index/task-status", task_id)
            .await
    }

    /// Polls an already submitted task until it completes, fails or the
    /// retry ceiling is reached.
    pub async fn poll_until_done(&self, task_id: &str, options: PollOptions) -> Result<TaskStatus> {
        task::poll_until_done(self, task_id, options).await
    }
}

#[async_trait]
impl TaskStatusSource for IqSuiteClient {
    async fn task_status(&self, task_id: &str) -> Result<TaskStatus> {
        self.get_task_status(task_id).await
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::client_for;
    use super::*;
    use crate::error::Error;
    use crate::types::TaskState;
    use std::time::Duration;

    #[tokio::test]
    async fn test_get_user() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/user")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": {"id": 7, "name": "Ada", "email": "ada@example.com", "plan": "pro"}}"#)
            .create_async()
            .await;

        let user = client_for(&server).get_user().await.unwrap();

        mock.assert_async().await;
        assert_eq!(user.id, 7);
        assert_eq!(user.name.as_deref(), Some("Ada"));
        assert_eq!(user.extra.get("plan").and_then(|v| v.as_str()), Some("pro"));
    }

    #[tokio::test]
    async fn test_get_user_unauthorized() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/user")
            .with_status(401)
            .with_body(r#"{"error": "Unauthenticated."}"#)
            .create_async()
            .await;

        let result = client_for(&server).get_user().await;

        mock.assert_async().await;
        assert!(matches!(result, Err(Error::Authentication(_))));
    }

    #[tokio::test]
    async fn test_get_task_status() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/create-index/task-status/t-1")
            .with_status(200)
            .with_body(r#"{"data": {"status": "in_progress", "task_id": "t-1"}}"#)
            .create_async()
            .await;

        let status = client_for(&server).get_task_status("t-1").await.unwrap();

        mock.assert_async().await;
        assert_eq!(status.status, TaskState::InProgress);
    }

    #[tokio::test]
    async fn test_get_task_status_encodes_id_as_one_segment() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/create-index/task-status/a%2Fb%3Fc%20d")
            .with_status(200)
            .with_body(r#"{"data": {"status": "pending"}}"#)
            .expect(1)
            .create_async()
            .await;

        let status = client_for(&server)
            .get_task_status("a/b?c d")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(status.status, TaskState::Pending);
    }

    #[tokio::test]
    async fn test_get_task_status_rejects_dot_segments() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = client_for(&server);
        for task_id in ["", ".", ".."] {
            let result = client.get_task_status(task_id).await;
            assert!(
                matches!(result, Err(Error::InvalidTaskId { task_id: ref id }) if id == task_id),
                "unexpected result for {:?}",
                task_id
            );
        }

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_poll_until_done_over_http() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/create-index/task-status/t-9")
            .with_status(200)
            .with_body(r#"{"status": "completed", "index_id": "idx-3"}"#)
            .expect(1)
            .create_async()
            .await;

        let status = client_for(&server)
            .poll_until_done("t-9", PollOptions::new(3, Duration::from_millis(1)))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(status.status, TaskState::Completed);
        assert_eq!(status.index_id.as_deref(), Some("idx-3"));
    }

    #[tokio::test]
    async fn test_poll_keeps_transport_error_classification() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/create-index/task-status/t-1")
            .with_status(500)
            .with_body(r#"{"error": "worker crashed"}"#)
            .expect(1)
            .create_async()
            .await;

        let err = client_for(&server)
            .poll_until_done("t-1", PollOptions::new(3, Duration::from_millis(1)))
            .await
            .unwrap_err();

        mock.assert_async().await;
        match err {
            Error::Api { status, message, .. } => {
                assert_eq!(status, 500);
                assert_eq!(message, "HTTP 500 error: worker crashed");
            }
            other => panic!("Expected API error, got {:?}", other),
        }
    }

    #[test]
    fn test_new_rejects_empty_key() {
        assert!(IqSuiteClient::with_api_key("").is_err());
    }
}
