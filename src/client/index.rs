use log::info;
use serde::Serialize;

use super::IqSuiteClient;
use crate::error::Result;
use crate::task::{
    self, ADD_DOCUMENT_PATH, CREATE_INDEX_PATH, PollOptions, Upload, build_form, require_task_id,
};
use crate::types::{
    DeleteDocumentResponse, DocumentList, Index, InstantRag, InstantRagAnswer, RetrieveResponse,
    SearchResponse, SubmissionResult, TaskStatus,
};

#[derive(Serialize)]
struct QueryRequest<'a> {
    index: &'a str,
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    document_id: Option<&'a str>,
}

#[derive(Serialize)]
struct DeleteDocumentRequest<'a> {
    index: &'a str,
    document: &'a str,
}

#[derive(Serialize)]
struct InstantCreateRequest<'a> {
    context: &'a str,
}

impl IqSuiteClient {
    #[tracing::instrument(skip(self))]
    pub async fn list_indexes(&self) -> Result<Vec<Index>> {
        self.http.get("/index").await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_documents(&self, index_id: &str) -> Result<DocumentList> {
        self.http
            .get_with_query("/index/get-all-documents", &[("index", index_id)])
            .await
    }

    /// Uploads a document into a new index and returns the queued task.
    ///
    /// Unsupported file types are rejected before any request is made.
    #[tracing::instrument(skip(self, upload), fields(filename = %upload.filename))]
    pub async fn create_index(&self, upload: Upload) -> Result<SubmissionResult> {
        let form = build_form(&self.media_types, upload, None)?;
        self.http.post_multipart(CREATE_INDEX_PATH, form).await
    }

    /// Uploads a document into an existing index and returns the queued task.
    #[tracing::instrument(skip(self, upload), fields(filename = %upload.filename))]
    pub async fn add_document(&self, index_id: &str, upload: Upload) -> Result<SubmissionResult> {
        let form = build_form(&self.media_types, upload, Some(index_id))?;
        self.http.post_multipart(ADD_DOCUMENT_PATH, form).await
    }

    /// Creates an index and waits for ingestion to finish.
    #[tracing::instrument(skip(self, upload, options), fields(filename = %upload.filename))]
    pub async fn create_index_and_poll(
        &self,
        upload: Upload,
        options: PollOptions,
    ) -> Result<(SubmissionResult, TaskStatus)> {
        let submission = self.create_index(upload).await?;
        self.wait_for_submission(CREATE_INDEX_PATH, submission, options)
            .await
    }

    /// Adds a document to an index and waits for ingestion to finish.
    #[tracing::instrument(skip(self, upload, options), fields(filename = %upload.filename))]
    pub async fn add_document_and_poll(
        &self,
        index_id: &str,
        upload: Upload,
        options: PollOptions,
    ) -> Result<(SubmissionResult, TaskStatus)> {
        let submission = self.add_document(index_id, upload).await?;
        self.wait_for_submission(ADD_DOCUMENT_PATH, submission, options)
            .await
    }

    async fn wait_for_submission(
        &self,
        endpoint: &str,
        submission: SubmissionResult,
        options: PollOptions,
    ) -> Result<(SubmissionResult, TaskStatus)> {
        let task_id = require_task_id(endpoint, &submission)?;
        info!("Task {} queued, polling for completion...", task_id);

        let status = task::poll_until_done(self, task_id, options).await?;

        info!("Task {} completed.", task_id);
        Ok((submission, status))
    }

    /// Retrieval over an index, optionally scoped to one document.
    #[tracing::instrument(skip(self))]
    pub async fn retrieve(
        &self,
        index_id: &str,
        query: &str,
        document_id: Option<&str>,
    ) -> Result<RetrieveResponse> {
        let body = QueryRequest {
            index: index_id,
            query,
            document_id,
        };
        self.http.post_json("/index/retrieve", &body).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn search(&self, index_id: &str, query: &str) -> Result<SearchResponse> {
        let body = QueryRequest {
            index: index_id,
            query,
            document_id: None,
        };
        self.http.post_json("/index/search", &body).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_document(
        &self,
        index_id: &str,
        document_id: &str,
    ) -> Result<DeleteDocumentResponse> {
        let body = DeleteDocumentRequest {
            index: index_id,
            document: document_id,
        };
        self.http.post_json("/index/delete-document", &body).await
    }

    /// Builds an ad-hoc index from inline context.
    #[tracing::instrument(skip(self, context))]
    pub async fn create_instant_rag(&self, context: &str) -> Result<InstantRag> {
        self.http
            .post_json("/index/instant/create", &InstantCreateRequest { context })
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn query_instant_rag(&self, index_id: &str, query: &str) -> Result<InstantRagAnswer> {
        let body = QueryRequest {
            index: index_id,
            query,
            document_id: None,
        };
        self.http.post_json("/index/instant/query", &body).await
    }
}
