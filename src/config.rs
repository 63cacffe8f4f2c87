//! Configuration loading and management.
//!
//! Loads gateway configuration from `./oraculo.toml` (or
//! `$ORACULO_CONFIG_PATH`). Environment variables override file values;
//! file values override defaults.
//!
//! Precedence: env vars > config file > defaults.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level gateway configuration loaded from TOML.
///
/// Path: `./oraculo.toml` or `$ORACULO_CONFIG_PATH`.
/// Env vars override file values; file values override defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// LLM model and token settings (`[llm]`).
    pub llm: LlmConfig,
    /// Dispatch behavior settings (`[gateway]`).
    pub gateway: DispatchConfig,
    /// Web-analytics reporting settings (`[analytics]`).
    pub analytics: AnalyticsConfig,
    /// Search-performance reporting settings (`[search]`).
    pub search: SearchConfig,
    /// Spreadsheet service settings (`[sheets]`).
    pub sheets: SheetsConfig,
}

/// LLM settings for the classify and narrate calls.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Model identifier sent to the provider.
    pub model: String,
    /// Max tokens for the classification call.
    pub classify_max_tokens: u32,
    /// Max tokens for the narration call.
    pub narrate_max_tokens: u32,
    /// Sampling temperature for classification (deterministic by default).
    pub classify_temperature: f32,
    /// Sampling temperature for narration.
    pub narrate_temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "claude-3-5-sonnet-20240620".to_owned(),
            classify_max_tokens: 1000,
            narrate_max_tokens: 1500,
            classify_temperature: 0.0,
            narrate_temperature: 0.2,
        }
    }
}

/// Dispatch behavior settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Maximum rows returned by any tabular adapter result.
    pub max_rows: usize,
    /// Per-call HTTP timeout in seconds, applied to the shared client.
    pub request_timeout_secs: u64,
    /// Whether to run the narration phase after dispatch.
    pub narrate: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_rows: 100,
            request_timeout_secs: 30,
            narrate: true,
        }
    }
}

/// Web-analytics reporting settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Analytics property resource name, e.g. `properties/123456`.
    pub property_id: String,
}

/// Search-performance reporting settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Verified site URL the queries run against.
    pub site_url: String,
}

/// Spreadsheet service settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
    /// Email address newly created spreadsheets are shared with.
    pub share_email: String,
}

impl GatewayConfig {
    /// Load configuration with precedence: env vars > TOML file > defaults.
    ///
    /// Config file path: `$ORACULO_CONFIG_PATH` or `./oraculo.toml`.
    /// If the file does not exist, returns defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from_file()?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML does not match the config schema.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse config TOML")
    }

    /// Load from TOML file only, no env overrides.
    fn load_from_file() -> Result<Self> {
        let path = Self::config_path();
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                tracing::info!(path = %path.display(), "loading config from file");
                Self::from_toml_str(&contents)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("no config file found, using defaults");
                Ok(GatewayConfig::default())
            }
            Err(e) => Err(anyhow::anyhow!("failed to read config file: {e}")),
        }
    }

    /// Resolve the config file path.
    ///
    /// Checks `$ORACULO_CONFIG_PATH` first, then `./oraculo.toml` in the
    /// working directory.
    fn config_path() -> PathBuf {
        match std::env::var("ORACULO_CONFIG_PATH") {
            Ok(p) => PathBuf::from(p),
            Err(_) => PathBuf::from("oraculo.toml"),
        }
    }

    /// Apply environment variable overrides (env > config > defaults).
    ///
    /// Takes a resolver function for testability (avoids `set_var` in tests).
    pub fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        // LLM.
        if let Some(v) = env("ORACULO_LLM_MODEL") {
            self.llm.model = v;
        }

        // Gateway.
        if let Some(v) = env("ORACULO_MAX_ROWS") {
            match v.parse() {
                Ok(n) => self.gateway.max_rows = n,
                Err(_) => tracing::warn!(
                    var = "ORACULO_MAX_ROWS",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
        if let Some(v) = env("ORACULO_REQUEST_TIMEOUT_SECS") {
            match v.parse() {
                Ok(n) => self.gateway.request_timeout_secs = n,
                Err(_) => tracing::warn!(
                    var = "ORACULO_REQUEST_TIMEOUT_SECS",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
        if let Some(v) = env("ORACULO_NARRATE") {
            match v.parse() {
                Ok(b) => self.gateway.narrate = b,
                Err(_) => tracing::warn!(
                    var = "ORACULO_NARRATE",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }

        // Integrations.
        if let Some(v) = env("ORACULO_GA4_PROPERTY") {
            self.analytics.property_id = v;
        }
        if let Some(v) = env("ORACULO_SITE_URL") {
            self.search.site_url = v;
        }
        if let Some(v) = env("ORACULO_SHARE_EMAIL") {
            self.sheets.share_email = v;
        }
    }
}
