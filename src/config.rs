use log::{debug, warn};
use reqwest::{
    Client,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue},
};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::media::MediaTypes;

pub const DEFAULT_BASE_URL: &str = "https://iqsuite.ai/api/v1";

/// Immutable settings shared by every call a client makes.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    /// Set to false to accept invalid TLS certificates (testing only).
    pub verify_ssl: bool,
    pub timeout: Option<Duration>,
    pub user_agent: String,
    pub media_types: MediaTypes,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            verify_ssl: true,
            timeout: None,
            user_agent: format!("iqsuite/{}", env!("IQSUITE_VERSION")),
            media_types: MediaTypes::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_verify_ssl(mut self, verify_ssl: bool) -> Self {
        self.verify_ssl = verify_ssl;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_media_types(mut self, media_types: MediaTypes) -> Self {
        self.media_types = media_types;
        self
    }

    /// Base URL without the trailing slash.
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Builds the reqwest Client carrying the credential and TLS policy.
    pub fn build_http_client(&self) -> Result<Client> {
        if self.api_key.trim().is_empty() {
            return Err(Error::Config("API key must not be empty".to_string()));
        }
        if self.normalized_base_url().is_empty() {
            return Err(Error::Config("base URL must not be empty".to_string()));
        }

        let mut headers = HeaderMap::new();
        let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|e| Error::Config(format!("API key is not a valid header value: {}", e)))?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        debug!("Using API key for authentication: {}", mask(&self.api_key));

        let mut builder = Client::builder()
            .user_agent(self.user_agent.as_str())
            .default_headers(headers);

        if !self.verify_ssl {
            warn!("TLS certificate verification is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))
    }
}

/// Masks all but the edges of a secret for logging.
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 12 {
        return "*********".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}*********{}", head, tail)
}
