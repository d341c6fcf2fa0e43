//! Monitor wire types, response parsing and API errors.
//!
//! Parsing is kept in free functions over response text so the HTTP and
//! fetch transports share it and tests need no network.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::identity::UserKey;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by monitor API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The configured base URL cannot address the monitor endpoints.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// The request never produced a response (DNS, connect, TLS, timeout).
    #[error("request failed: {0}")]
    Request(String),

    /// The API answered with a non-success status.
    #[error("HTTP error! status: {status}")]
    Status { status: u16, detail: Option<String> },

    /// A success response body could not be deserialized.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    /// Build a status error, pulling the structured `detail` out of `body`.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        Self::Status { status, detail: parse_error_detail(body) }
    }

    /// Text suitable for showing to the user: the API's own detail when it
    /// sent one, otherwise the error description.
    #[must_use]
    pub fn user_detail(&self) -> String {
        match self {
            Self::Status { detail: Some(detail), .. } => detail.clone(),
            other => other.to_string(),
        }
    }
}

// =============================================================================
// IDS
// =============================================================================

/// Server-assigned monitor identifier.
///
/// Opaque to the client. Accepts JSON strings or integers on the wire and is
/// always held as text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MonitorId(String);

impl MonitorId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for MonitorId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => Self(text),
            RawId::Signed(n) => Self(n.to_string()),
            RawId::Unsigned(n) => Self(n.to_string()),
        })
    }
}

impl From<String> for MonitorId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for MonitorId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for MonitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// RECORDS
// =============================================================================

/// A watched (URL, CSS selector) pair with its notification email.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monitor {
    pub id: MonitorId,
    pub url: String,
    pub css_selector: String,
    pub user_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_key: Option<UserKey>,
}

/// `POST /monitors` body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewMonitor {
    pub url: String,
    pub css_selector: String,
    pub user_email: String,
    pub user_key: UserKey,
}

impl NewMonitor {
    /// Combine the submitted fields with the server-assigned id.
    #[must_use]
    pub fn into_monitor(self, id: MonitorId) -> Monitor {
        Monitor {
            id,
            url: self.url,
            css_selector: self.css_selector,
            user_email: self.user_email,
            user_key: Some(self.user_key),
        }
    }
}

/// The part of a create response the client relies on.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CreatedMonitor {
    pub id: MonitorId,
}

// =============================================================================
// PARSING
// =============================================================================

#[derive(Deserialize)]
struct ListResponse {
    #[serde(default)]
    data: Option<Vec<Monitor>>,
}

/// Parse a `GET /monitors` body. Missing or null `data` is an empty list.
///
/// # Errors
///
/// Returns [`ApiError::Parse`] if the body is not the expected shape.
pub fn parse_list_response(body: &str) -> Result<Vec<Monitor>, ApiError> {
    let parsed: ListResponse = serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))?;
    Ok(parsed.data.unwrap_or_default())
}

/// Parse a `POST /monitors` success body.
///
/// # Errors
///
/// Returns [`ApiError::Parse`] if the body has no usable `id`.
pub fn parse_created_response(body: &str) -> Result<CreatedMonitor, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))
}

/// Extract `detail` from an error body.
///
/// Handles both a plain string and a validation-error array of `{msg}`
/// objects (joined with `"; "`). Returns `None` for anything else.
#[must_use]
pub fn parse_error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(detail) if !detail.trim().is_empty() => Some(detail.clone()),
        serde_json::Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(serde_json::Value::as_str))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
