//! Startup configuration.
//!
//! The API key never lives in the source tree. It is read from the environment, optionally
//! seeded from a `.env` file in the working directory.

use crate::youtube_api::DEFAULT_BASE_URL;

/// Environment variable holding the YouTube Data API key.
pub const API_KEY_VAR: &str = "YOUTUBE_API_KEY";

/// Environment variable overriding the API root, mostly useful for pointing at a mock server.
pub const API_BASE_URL_VAR: &str = "YOUTUBE_API_BASE_URL";

/// Immutable settings shared by both binaries.
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub api_base_url: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl Config {
    /// Loads `.env` (if any) and reads the configuration from the process environment.
    pub fn from_env() -> eyre::Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env file"),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!("ignoring unreadable .env file: {e}"),
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> eyre::Result<Self> {
        let api_key = lookup(API_KEY_VAR)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        let Some(api_key) = api_key else {
            eyre::bail!("{API_KEY_VAR} must be set to a YouTube Data API key");
        };

        let api_base_url = lookup(API_BASE_URL_VAR)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            api_key,
            api_base_url,
        })
    }
}
