//! Credential loading from the process environment and an optional `.env`.
//!
//! Every third-party secret the gateway uses is named here. Adapters receive
//! their credential at construction time; nothing reads the environment after
//! startup.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

/// Env key for the LLM provider API key.
pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
/// Env key for the Google APIs bearer token (Analytics, Search Console,
/// Drive, Sheets).
pub const GOOGLE_ACCESS_TOKEN: &str = "GOOGLE_ACCESS_TOKEN";
/// Env key for the YouTube Data API key.
pub const YOUTUBE_API_KEY: &str = "YOUTUBE_API_KEY";
/// Env key for the Trello API key.
pub const TRELLO_API_KEY: &str = "TRELLO_API_KEY";
/// Env key for the Trello member token.
pub const TRELLO_TOKEN: &str = "TRELLO_TOKEN";

const KNOWN_KEYS: [&str; 5] = [
    ANTHROPIC_API_KEY,
    GOOGLE_ACCESS_TOKEN,
    YOUTUBE_API_KEY,
    TRELLO_API_KEY,
    TRELLO_TOKEN,
];

/// Credentials loaded at process start.
#[derive(Clone, Default)]
pub struct Credentials {
    vars: BTreeMap<String, String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("keys", &self.vars.keys().collect::<Vec<_>>())
            .field("values", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    /// Build credentials from a key-value map.
    pub fn from_map(vars: BTreeMap<String, String>) -> Self {
        Self { vars }
    }

    /// Returns a credential value for a key, if present and non-empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Returns a required credential or an error when missing.
    ///
    /// # Errors
    ///
    /// Returns an error when the key does not exist in loaded credentials.
    pub fn require(&self, key: &str) -> anyhow::Result<String> {
        self.get(key)
            .map(ToOwned::to_owned)
            .ok_or_else(|| anyhow::anyhow!("missing required credential: {key}"))
    }
}

/// Load credentials: `.env` file values first, process env on top.
///
/// The `.env` path is `{runtime_dir}/.env` (see [`runtime_dir`]); a missing
/// file is not an error since all keys may come from the process environment.
///
/// # Errors
///
/// Returns an error if an existing `.env` file cannot be parsed.
pub fn load_credentials(env_path: &Path) -> anyhow::Result<Credentials> {
    let mut vars = BTreeMap::new();

    if env_path.exists() {
        let iter = dotenvy::from_path_iter(env_path)
            .with_context(|| format!("failed to read credentials at {}", env_path.display()))?;
        for item in iter {
            let (key, value) = item.with_context(|| {
                format!(
                    "failed to parse key-value entry in credentials file {}",
                    env_path.display()
                )
            })?;
            vars.insert(key, value);
        }
        debug!(path = %env_path.display(), "loaded credentials file");
    }

    // Process env wins over file values.
    for key in KNOWN_KEYS {
        if let Ok(value) = std::env::var(key) {
            vars.insert(key.to_owned(), value);
        }
    }

    Ok(Credentials { vars })
}

/// Resolve the runtime directory (`~/.oraculo`), creating it if needed.
///
/// # Errors
///
/// Returns an error if the home directory cannot be resolved or the
/// directory cannot be created.
pub fn runtime_dir() -> anyhow::Result<PathBuf> {
    let base = directories::BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("could not resolve home directory"))?;
    let dir = base.home_dir().join(".oraculo");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create runtime dir {}", dir.display()))?;
    Ok(dir)
}
