//! Client configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "https://niche-api1.onrender.com";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Errors produced while building a [`ClientConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The API base URL is not an absolute http(s) URL.
    #[error("invalid MONITOR_API_URL '{0}' (expected an http:// or https:// URL)")]
    InvalidApiUrl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTimeouts {
    /// Whole-request timeout; `None` leaves the transport default in place.
    pub request_secs: Option<u64>,
    pub connect_secs: u64,
}

impl Default for RequestTimeouts {
    fn default() -> Self {
        Self { request_secs: None, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub storage_path: Option<PathBuf>,
    pub timeouts: RequestTimeouts,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { api_url: DEFAULT_API_URL.to_owned(), storage_path: None, timeouts: RequestTimeouts::default() }
    }
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `MONITOR_API_URL`: API base URL, default [`DEFAULT_API_URL`]
    /// - `MONITOR_STORAGE_PATH`: identity store file (native builds)
    /// - `MONITOR_REQUEST_TIMEOUT_SECS`: unset means no explicit timeout
    /// - `MONITOR_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiUrl`] for a malformed base URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] over an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiUrl`] for a malformed base URL.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = match lookup("MONITOR_API_URL").filter(|v| !v.trim().is_empty()) {
            Some(raw) => normalize_api_url(&raw)?,
            None => DEFAULT_API_URL.to_owned(),
        };
        let storage_path = lookup("MONITOR_STORAGE_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        let timeouts = RequestTimeouts {
            request_secs: lookup("MONITOR_REQUEST_TIMEOUT_SECS").and_then(|v| v.trim().parse::<u64>().ok()),
            connect_secs: parse_u64(lookup("MONITOR_CONNECT_TIMEOUT_SECS"), DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { api_url, storage_path, timeouts })
    }

    /// Replace the API base URL (e.g. from a command-line flag).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiUrl`] for a malformed base URL.
    pub fn with_api_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.api_url = normalize_api_url(raw)?;
        Ok(self)
    }
}

/// Trim whitespace and trailing slashes; require an absolute http(s) URL.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidApiUrl`] when the value does not parse or uses
/// another scheme.
pub fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = url::Url::parse(trimmed).map_err(|_| ConfigError::InvalidApiUrl(raw.to_owned()))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(ConfigError::InvalidApiUrl(raw.to_owned()));
    }
    Ok(trimmed.to_owned())
}

fn parse_u64(raw: Option<String>, default: u64) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
