use serde::Serialize;
use serde_json::{Map, Value};

use super::IqSuiteClient;
use crate::error::Result;
use crate::types::{Webhook, WebhookEnvelope};

/// Fields of a webhook registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookSpec {
    pub url: String,
    pub name: String,
    pub enabled: bool,
}

#[derive(Serialize)]
struct CreateWebhookRequest<'a> {
    url: &'a str,
    name: &'a str,
    enabled: &'static str,
    secret: &'a str,
}

#[derive(Serialize)]
struct UpdateWebhookRequest<'a> {
    webhook_id: &'a str,
    url: &'a str,
    name: &'a str,
    enabled: &'static str,
}

#[derive(Serialize)]
struct DeleteWebhookRequest<'a> {
    webhook_id: &'a str,
}

/// The backend expects the flag as a string.
fn flag(enabled: bool) -> &'static str {
    if enabled { "true" } else { "false" }
}

impl IqSuiteClient {
    #[tracing::instrument(skip(self))]
    pub async fn list_webhooks(&self) -> Result<Vec<Webhook>> {
        self.http.get("/webhooks").await
    }

    #[tracing::instrument(skip(self, spec, secret), fields(name = %spec.name))]
    pub async fn create_webhook(&self, spec: &WebhookSpec, secret: &str) -> Result<Webhook> {
        let body = CreateWebhookRequest {
            url: &spec.url,
            name: &spec.name,
            enabled: flag(spec.enabled),
            secret,
        };
        let envelope: WebhookEnvelope = self.http.post_json("/webhooks", &body).await?;
        Ok(envelope.webhook)
    }

    #[tracing::instrument(skip(self, spec), fields(name = %spec.name))]
    pub async fn update_webhook(&self, webhook_id: &str, spec: &WebhookSpec) -> Result<Webhook> {
        let body = UpdateWebhookRequest {
            webhook_id,
            url: &spec.url,
            name: &spec.name,
            enabled: flag(spec.enabled),
        };
        let envelope: WebhookEnvelope = self.http.post_json("/webhooks/update", &body).await?;
        Ok(envelope.webhook)
    }

    /// Deletes a webhook and returns whatever confirmation the backend sends.
    #[tracing::instrument(skip(self))]
    pub async fn delete_webhook(&self, webhook_id: &str) -> Result<Map<String, Value>> {
        self.http
            .post_json("/webhooks/delete", &DeleteWebhookRequest { webhook_id })
            .await
    }
}
