//! Command-line operations. Each command performs one client call (or a
//! submit-and-poll pair) and writes the result as pretty JSON.

use anyhow::{Context, Result};
use log::debug;
use serde::Serialize;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::{IqSuiteClient, WebhookSpec};
use crate::task::{DEFAULT_MAX_RETRIES, DEFAULT_POLL_INTERVAL_MS, PollOptions, Upload};

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Show the account behind the API key
    User,

    /// List indexes
    Indexes,

    /// List the documents of an index
    Documents {
        #[arg(value_name = "INDEX")]
        index: String,
    },

    /// Create a new index from a document
    CreateIndex {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        poll: PollArgs,
    },

    /// Add a document to an existing index
    AddDocument {
        #[arg(value_name = "INDEX")]
        index: String,

        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        poll: PollArgs,
    },

    /// Show the status of an ingestion task
    TaskStatus {
        #[arg(value_name = "TASK_ID")]
        task_id: String,
    },

    /// Retrieve an answer from an index
    Retrieve {
        #[arg(value_name = "INDEX")]
        index: String,

        #[arg(value_name = "QUERY")]
        query: String,

        /// Restrict retrieval to one document
        #[arg(long = "document", value_name = "ID")]
        document: Option<String>,
    },

    /// Search an index
    Search {
        #[arg(value_name = "INDEX")]
        index: String,

        #[arg(value_name = "QUERY")]
        query: String,
    },

    /// Delete a document from an index
    DeleteDocument {
        #[arg(value_name = "INDEX")]
        index: String,

        #[arg(value_name = "DOCUMENT")]
        document: String,
    },

    /// Build an instant index from inline text
    InstantCreate {
        #[arg(value_name = "CONTEXT")]
        context: String,
    },

    /// Query an instant index
    InstantQuery {
        #[arg(value_name = "INDEX")]
        index: String,

        #[arg(value_name = "QUERY")]
        query: String,
    },

    /// Manage webhooks
    #[command(subcommand)]
    Webhooks(WebhookCommand),
}

#[derive(clap::Subcommand)]
pub enum WebhookCommand {
    /// List webhooks
    List,

    /// Register a webhook
    Create {
        #[command(flatten)]
        webhook: WebhookArgs,

        /// Secret used to sign deliveries
        #[arg(long, env = "IQSUITE_WEBHOOK_SECRET", hide_env_values = true)]
        secret: String,
    },

    /// Update a webhook
    Update {
        #[arg(value_name = "WEBHOOK_ID")]
        id: String,

        #[command(flatten)]
        webhook: WebhookArgs,
    },

    /// Delete a webhook
    Delete {
        #[arg(value_name = "WEBHOOK_ID")]
        id: String,
    },
}

// `run` records its command in a span, so the signing secret stays out of Debug.
impl fmt::Debug for WebhookCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebhookCommand::List => f.write_str("List"),
            WebhookCommand::Create { webhook, .. } => f
                .debug_struct("Create")
                .field("webhook", webhook)
                .field("secret", &"<redacted>")
                .finish(),
            WebhookCommand::Update { id, webhook } => f
                .debug_struct("Update")
                .field("id", id)
                .field("webhook", webhook)
                .finish(),
            WebhookCommand::Delete { id } => f.debug_struct("Delete").field("id", id).finish(),
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct WebhookArgs {
    #[arg(long)]
    pub url: String,

    #[arg(long)]
    pub name: String,

    /// Register the webhook disabled
    #[arg(long)]
    pub disabled: bool,
}

impl From<WebhookArgs> for WebhookSpec {
    fn from(args: WebhookArgs) -> Self {
        WebhookSpec {
            url: args.url,
            name: args.name,
            enabled: !args.disabled,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct PollArgs {
    /// Wait for ingestion to finish
    #[arg(long)]
    pub poll: bool,

    /// Maximum number of status queries when polling
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,

    /// Milliseconds to wait between status queries
    #[arg(long = "poll-interval-ms", default_value_t = DEFAULT_POLL_INTERVAL_MS)]
    pub poll_interval_ms: u64,
}

impl PollArgs {
    pub fn options(&self) -> PollOptions {
        PollOptions::new(self.max_retries, Duration::from_millis(self.poll_interval_ms))
    }
}

/// Reads a file into an upload named after the file.
pub async fn read_upload(path: &Path) -> Result<Upload> {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Invalid file name: {:?}", path))?
        .to_string();
    let content = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {:?}", path))?;
    debug!("Read {} bytes from {:?}", content.len(), path);
    Ok(Upload::new(filename, content))
}

fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("Failed to serialize output")?;
    writeln!(out)?;
    Ok(())
}

/// Runs one command against the service.
#[tracing::instrument(skip(client, out))]
pub async fn run<W: Write>(client: &IqSuiteClient, command: Command, out: &mut W) -> Result<()> {
    match command {
        Command::User => write_json(out, &client.get_user().await?),
        Command::Indexes => write_json(out, &client.list_indexes().await?),
        Command::Documents { index } => write_json(out, &client.get_documents(&index).await?),
        Command::CreateIndex { file, poll } => {
            let upload = read_upload(&file).await?;
            if poll.poll {
                let (submission, status) =
                    client.create_index_and_poll(upload, poll.options()).await?;
                write_json(out, &serde_json::json!({"submission": submission, "status": status}))
            } else {
                write_json(out, &client.create_index(upload).await?)
            }
        }
        Command::AddDocument { index, file, poll } => {
            let upload = read_upload(&file).await?;
            if poll.poll {
                let (submission, status) = client
                    .add_document_and_poll(&index, upload, poll.options())
                    .await?;
                write_json(out, &serde_json::json!({"submission": submission, "status": status}))
            } else {
                write_json(out, &client.add_document(&index, upload).await?)
            }
        }
        Command::TaskStatus { task_id } => {
            write_json(out, &client.get_task_status(&task_id).await?)
        }
        Command::Retrieve {
            index,
            query,
            document,
        } => write_json(
            out,
            &client
                .retrieve(&index, &query, document.as_deref())
                .await?,
        ),
        Command::Search { index, query } => write_json(out, &client.search(&index, &query).await?),
        Command::DeleteDocument { index, document } => {
            write_json(out, &client.delete_document(&index, &document).await?)
        }
        Command::InstantCreate { context } => {
            write_json(out, &client.create_instant_rag(&context).await?)
        }
        Command::InstantQuery { index, query } => {
            write_json(out, &client.query_instant_rag(&index, &query).await?)
        }
        Command::Webhooks(command) => run_webhook(client, command, out).await,
    }
}

async fn run_webhook<W: Write>(
    client: &IqSuiteClient,
    command: WebhookCommand,
    out: &mut W,
) -> Result<()> {
    match command {
        WebhookCommand::List => write_json(out, &client.list_webhooks().await?),
        WebhookCommand::Create { webhook, secret } => {
            let spec = WebhookSpec::from(webhook);
            write_json(out, &client.create_webhook(&spec, &secret).await?)
        }
        WebhookCommand::Update { id, webhook } => {
            let spec = WebhookSpec::from(webhook);
            write_json(out, &client.update_webhook(&id, &spec).await?)
        }
        WebhookCommand::Delete { id } => write_json(out, &client.delete_webhook(&id).await?),
    }
}
