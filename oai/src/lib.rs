use std::time::Duration;

use anyhow::{Context, Result};
use oai_openai::{OpenAiClient, OpenAiConfig};
use tracing_subscriber::EnvFilter;

pub mod cli;
pub mod commands;
pub mod render;

use cli::Cli;

pub const MISSING_KEY_MESSAGE: &str = "Please set the OPENAI_API_KEY environment variable.";

pub struct AppContext {
    pub client: OpenAiClient,
}

impl AppContext {
    /// Builds the client from the global flags. Fails before any command runs
    /// when no API key is configured.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let api_key = cli
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .context(MISSING_KEY_MESSAGE)?;

        let config = OpenAiConfig::new(api_key)?
            .base_url(&cli.base_url)?
            .timeout(Duration::from_secs(cli.timeout_secs));
        let client = OpenAiClient::new(config).context("Failed to create OpenAI client")?;
        Ok(AppContext { client })
    }
}

/// Filter directive for the given flags; `RUST_LOG` overrides it.
pub fn default_log_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs the stderr subscriber. Safe to call more than once.
pub fn init_logging(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(verbose, quiet)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
