//! @ai:module:intent Configuration for the VarSome API client
//! @ai:module:layer infrastructure
//! @ai:module:public_api ClientConfig, load_api_key, resolve_api_key, API_KEY_ENV
//! @ai:module:stateless true

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Public VarSome endpoint.
pub const DEFAULT_API_URL: &str = "https://api.varsome.com";

/// Environment variable consulted when no key is given explicitly.
pub const API_KEY_ENV: &str = "VARSOME_API_KEY";

/// @ai:intent Client configuration, immutable once a client is built from it
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Overall request timeout; unset leaves the transport default.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            batch_size: default_batch_size(),
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

fn default_batch_size() -> usize {
    10_000
}

fn default_base_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl ClientConfig {
    /// @ai:intent Default configuration carrying the given API key
    /// @ai:effects pure
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    /// @ai:intent Load configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// @ai:intent Reject configurations a client cannot operate with
    /// @ai:effects pure
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if self.base_url.trim().is_empty() {
            return Err(Error::InvalidConfig("base_url must not be empty".to_string()));
        }
        Ok(())
    }

    /// @ai:effects pure
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// @ai:intent Base URL without a trailing slash
    /// @ai:effects pure
    pub fn api_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

/// @ai:intent Read an API key from a file, trimming surrounding whitespace
/// @ai:post result is non-empty
/// @ai:effects fs:read
pub fn load_api_key(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let key = content.trim();
    if key.is_empty() {
        return Err(Error::MissingApiKey);
    }
    Ok(key.to_string())
}

/// @ai:intent Pick the API key from the first available source
/// @ai:effects fs:read, env
/// Order: explicit key, key file, configured key, `VARSOME_API_KEY`.
pub fn resolve_api_key(
    explicit: Option<String>,
    key_file: Option<&Path>,
    configured: Option<String>,
) -> Result<Option<String>> {
    if let Some(key) = explicit {
        return Ok(Some(key));
    }
    if let Some(path) = key_file {
        return load_api_key(path).map(Some);
    }
    if configured.is_some() {
        return Ok(configured);
    }
    Ok(std::env::var(API_KEY_ENV)
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty()))
}
