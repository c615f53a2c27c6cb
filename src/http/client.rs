//! HTTP transport with envelope unwrapping and error classification.

use log::debug;
use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::classify::{classify_envelope_error, classify_status, classify_transport};
use super::envelope::{self, Envelope};
use crate::error::{Error, Result};

/// Authenticated transport bound to one base URL.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Creates a transport over an already configured reqwest Client.
    /// A trailing slash on `base_url` is ignored.
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Returns a reference to the underlying reqwest Client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `path` followed by `segment`, percent-encoded as exactly one segment.
    fn url_with_segment(&self, path: &str, segment: &str) -> Result<Url> {
        let mut url = Url::parse(&self.url(path))
            .map_err(|e| Error::Config(format!("Invalid base URL {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("Base URL {} cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }

    /// Performs a GET request and returns the unwrapped payload.
    #[tracing::instrument(skip(self))]
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!("GET {}...", path);
        self.execute(self.client.get(self.url(path))).await
    }

    /// Performs a GET request on `path` plus one encoded segment, such as an id.
    ///
    /// Dot segments are dropped by URL normalization, so callers must reject
    /// `.` and `..` themselves.
    #[tracing::instrument(skip(self))]
    pub async fn get_segment<T: DeserializeOwned>(&self, path: &str, segment: &str) -> Result<T> {
        let url = self.url_with_segment(path, segment)?;
        debug!("GET {}...", url.path());
        self.execute(self.client.get(url)).await
    }

    /// Performs a GET request with query parameters and returns the unwrapped payload.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        debug!("GET {} with query {:?}...", path, query);
        self.execute(self.client.get(self.url(path)).query(query))
            .await
    }

    /// Performs a POST request with a JSON body and returns the unwrapped payload.
    #[tracing::instrument(skip(self, body))]
    pub async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        debug!("POST {}...", path);
        self.execute(self.client.post(self.url(path)).json(body))
            .await
    }

    /// Performs a multipart POST request and returns the unwrapped payload.
    #[tracing::instrument(skip(self, form))]
    pub async fn post_multipart<T: DeserializeOwned>(&self, path: &str, form: Form) -> Result<T> {
        debug!("POST multipart {}...", path);
        self.execute(self.client.post(self.url(path)).multipart(form))
            .await
    }

    /// Sends one request, classifying any failure exactly once.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await.map_err(classify_transport)?;
        let status = response.status();
        let body = response.text().await.map_err(classify_transport)?;

        if !status.is_success() {
            debug!("Request failed with HTTP {}", status.as_u16());
            return Err(classify_status(status, body));
        }

        let value: Value = if body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&body).map_err(|e| {
                Error::Unknown(format!("Failed to parse JSON response: {}", e))
            })?
        };

        match envelope::open(value) {
            Envelope::Error(message) => Err(classify_envelope_error(status, message, body)),
            Envelope::Payload(payload) => serde_json::from_value(payload).map_err(|e| {
                Error::Unknown(format!("Unexpected response payload: {}", e))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn client_for(server: &mockito::Server) -> HttpClient {
        HttpClient::new(Client::new(), &server.url())
    }

    #[tokio::test]
    async fn test_get_unwraps_data() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/thing")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": {"k": "v"}}"#)
            .create_async()
            .await;

        let result: Value = client_for(&server).get("/thing").await.unwrap();

        mock.assert_async().await;
        assert_eq!(result, json!({"k": "v"}));
    }

    #[tokio::test]
    async fn test_get_returns_whole_body_without_data() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/thing")
            .with_status(200)
            .with_body(r#"{"k": "v"}"#)
            .create_async()
            .await;

        let result: Value = client_for(&server).get("thing").await.unwrap();

        mock.assert_async().await;
        assert_eq!(result, json!({"k": "v"}));
    }

    #[tokio::test]
    async fn test_error_field_with_ok_status_is_failure() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/thing")
            .with_status(200)
            .with_body(r#"{"error": "x"}"#)
            .create_async()
            .await;

        let result: Result<Value> = client_for(&server).get("/thing").await;

        mock.assert_async().await;
        match result {
            Err(Error::Api {
                status, message, ..
            }) => {
                assert_eq!(status, 200);
                assert_eq!(message, "API error: x");
            }
            other => panic!("Expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unauthorized_is_authentication_error() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/user")
            .with_status(401)
            .with_body(r#"{"data": {"id": 1}}"#)
            .create_async()
            .await;

        let result: Result<Value> = client_for(&server).get("/user").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(Error::Authentication(_))));
    }

    #[tokio::test]
    async fn test_unprocessable_is_validation_error() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/index/search")
            .with_status(422)
            .with_body(r#"{"message": "query must not be empty"}"#)
            .create_async()
            .await;

        let result: Result<Value> = client_for(&server)
            .post_json("/index/search", &json!({"index": "i", "query": ""}))
            .await;

        mock.assert_async().await;
        match result {
            Err(Error::Validation { message, .. }) => {
                assert_eq!(message, "query must not be empty")
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_error_keeps_raw_response() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/index")
            .with_status(503)
            .with_body("upstream down")
            .create_async()
            .await;

        let err = client_for(&server)
            .get::<Value>("/index")
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert_eq!(err.status_code(), Some(503));
        assert_eq!(err.response().unwrap().body, "upstream down");
    }

    #[tokio::test]
    async fn test_malformed_body_is_unknown_error() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/index")
            .with_status(200)
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let result: Result<Value> = client_for(&server).get("/index").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(Error::Unknown(_))));
    }

    #[tokio::test]
    async fn test_get_with_query() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/index/get-all-documents")
            .match_query(Matcher::UrlEncoded("index".into(), "idx-1".into()))
            .with_status(200)
            .with_body(r#"{"data": ["a", "b"]}"#)
            .create_async()
            .await;

        let result: Vec<String> = client_for(&server)
            .get_with_query("/index/get-all-documents", &[("index", "idx-1")])
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_post_json_sends_body() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/index/search")
            .match_body(Matcher::Json(json!({"index": "idx-1", "query": "q"})))
            .with_status(200)
            .with_body(r#"{"results": []}"#)
            .create_async()
            .await;

        let result: Value = client_for(&server)
            .post_json("/index/search", &json!({"index": "idx-1", "query": "q"}))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result, json!({"results": []}));
    }

    #[test]
    fn test_trailing_slash_is_stripped() {
        let client = HttpClient::new(Client::new(), "https://example.com/api/v1/");
        assert_eq!(client.base_url(), "https://example.com/api/v1");
        assert_eq!(client.url("/user"), "https://example.com/api/v1/user");
    }

    #[test]
    fn test_segment_is_percent_encoded() {
        let client = HttpClient::new(Client::new(), "https://example.com/api/v1/");
        let url = client
            .url_with_segment("/create-index/task-status", "a/b?c#d%")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/api/v1/create-index/task-status/a%2Fb%3Fc%23d%25"
        );
    }
}
