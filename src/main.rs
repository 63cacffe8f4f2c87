#![allow(missing_docs)]

//! Oraculo binary: bootstrap and CLI entrypoints.
//!
//! Builds every client once at startup with explicit dependencies (shared
//! HTTP client, credentials, config values), wires them into the intent
//! registry and hands the registry to the dispatcher. No global state.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use oraculo::adapters::stdio;
use oraculo::config::GatewayConfig;
use oraculo::credentials::{self, Credentials};
use oraculo::dispatch::{Dispatcher, IntentRegistry};
use oraculo::integrations::ga4::{self, Ga4Client};
use oraculo::integrations::search_console::{self, SearchConsoleClient};
use oraculo::integrations::sheets::{self, SheetsClient};
use oraculo::integrations::trello::{self, TrelloClient};
use oraculo::integrations::youtube::{self, YouTubeClient};
use oraculo::logging;
use oraculo::providers::anthropic::AnthropicProvider;

#[derive(Debug, Parser)]
#[command(name = "oraculo", version, about = "Natural-language analytics gateway")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve line-delimited JSON-RPC requests over stdio.
    Serve,
    /// Answer a single question and print the result envelope as JSON.
    Ask {
        /// The question text (words are joined with spaces).
        question: Vec<String>,
    },
    /// List the registered query intents and their parameters.
    Intents,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = GatewayConfig::load().context("failed to load configuration")?;

    match cli.command {
        Command::Serve => {
            let runtime_dir = credentials::runtime_dir()?;
            let _guard = logging::init_serve(&runtime_dir.join("logs"))?;
            info!(version = env!("CARGO_PKG_VERSION"), "oraculo starting");

            let dispatcher = build_dispatcher(&config)?;
            stdio::serve(&dispatcher).await
        }
        Command::Ask { question } => {
            logging::init_cli();
            let question = question.join(" ");
            if question.trim().is_empty() {
                anyhow::bail!("empty question");
            }

            let dispatcher = build_dispatcher(&config)?;
            let envelope = dispatcher.handle(&question).await?;
            println!("{}", serde_json::to_string_pretty(&envelope)?);
            Ok(())
        }
        Command::Intents => {
            logging::init_cli();
            // Listing needs no LLM key: build only the registry.
            let creds = load_runtime_credentials().unwrap_or_default();
            let client = build_http_client(&config)?;
            let registry = build_registry(&config, &creds, &client);
            println!("{}", registry.catalog());
            Ok(())
        }
    }
}

/// Load credentials from `~/.oraculo/.env` merged under the process env.
fn load_runtime_credentials() -> Result<Credentials> {
    let dir = credentials::runtime_dir()?;
    credentials::load_credentials(&dir.join(".env"))
}

/// Build the shared HTTP client carrying the per-call timeout.
fn build_http_client(config: &GatewayConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.gateway.request_timeout_secs))
        .build()
        .context("failed to build HTTP client")
}

/// Wire every integration into a fresh registry.
fn build_registry(
    config: &GatewayConfig,
    creds: &Credentials,
    client: &reqwest::Client,
) -> IntentRegistry {
    let max_rows = config.gateway.max_rows;
    let google_token = creds
        .get(credentials::GOOGLE_ACCESS_TOKEN)
        .map(ToOwned::to_owned);
    if google_token.is_none() {
        warn!("GOOGLE_ACCESS_TOKEN not set; analytics, search and spreadsheet queries will fail at call time");
    }

    let mut registry = IntentRegistry::new();

    ga4::register(
        &mut registry,
        Arc::new(Ga4Client::new(
            client.clone(),
            google_token.clone(),
            config.analytics.property_id.clone(),
            max_rows,
        )),
    );

    search_console::register(
        &mut registry,
        Arc::new(SearchConsoleClient::new(
            client.clone(),
            google_token.clone(),
            config.search.site_url.clone(),
            max_rows,
        )),
    );

    youtube::register(
        &mut registry,
        Arc::new(YouTubeClient::new(
            client.clone(),
            creds
                .get(credentials::YOUTUBE_API_KEY)
                .map(ToOwned::to_owned),
            max_rows,
        )),
    );

    sheets::register(
        &mut registry,
        Arc::new(SheetsClient::new(
            client.clone(),
            google_token,
            config.sheets.share_email.clone(),
            max_rows,
        )),
    );

    trello::register(
        &mut registry,
        Arc::new(TrelloClient::new(
            client.clone(),
            creds.get(credentials::TRELLO_API_KEY).map(ToOwned::to_owned),
            creds.get(credentials::TRELLO_TOKEN).map(ToOwned::to_owned),
            max_rows,
        )),
    );

    info!(intents = registry.len(), "intent registry initialised");
    registry
}

/// Build the full dispatcher: provider, registry, config.
fn build_dispatcher(config: &GatewayConfig) -> Result<Dispatcher> {
    let creds = load_runtime_credentials()?;
    let client = build_http_client(config)?;

    let api_key = creds
        .require(credentials::ANTHROPIC_API_KEY)
        .context("the gateway needs an LLM key to classify questions")?;
    let provider = Arc::new(AnthropicProvider::new(
        client.clone(),
        api_key,
        config.llm.model.clone(),
    ));

    let registry = build_registry(config, &creds, &client);

    Ok(Dispatcher::new(
        provider,
        registry,
        config.llm.clone(),
        config.gateway.narrate,
    ))
}
