use anyhow::Result;
use clap::Parser;
use iqsuite::commands::{self, Command};
use iqsuite::config::DEFAULT_BASE_URL;
use iqsuite::{ClientConfig, IqSuiteClient};
use std::time::Duration;

/// iqsuite - command-line client for the iQ Suite indexing and RAG service
///
/// Examples:
///   iqsuite create-index report.pdf --poll
///   iqsuite retrieve <INDEX> "What was Q3 revenue?"
#[derive(Parser, Debug)]
#[command(author, version = env!("IQSUITE_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// API key (also via IQSUITE_API_KEY)
    #[arg(long, env = "IQSUITE_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Service base URL
    #[arg(
        long,
        env = "IQSUITE_BASE_URL",
        default_value = DEFAULT_BASE_URL,
        value_name = "URL",
        global = true
    )]
    base_url: String,

    /// Skip TLS certificate verification (testing only)
    #[arg(long, global = true)]
    insecure: bool,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECONDS", global = true)]
    timeout: Option<u64>,
}

impl Cli {
    fn client_config(&self) -> Result<ClientConfig> {
        let api_key = self
            .api_key
            .clone()
            .ok_or_else(|| anyhow::anyhow!("An API key is required: pass --api-key or set IQSUITE_API_KEY"))?;

        let mut config = ClientConfig::new(api_key)
            .with_base_url(self.base_url.as_str())
            .with_verify_ssl(!self.insecure);
        if let Some(seconds) = self.timeout {
            config = config.with_timeout(Duration::from_secs(seconds));
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let client = IqSuiteClient::new(cli.client_config()?)?;
    let mut stdout = std::io::stdout().lock();
    commands::run(&client, cli.command, &mut stdout).await
}
