//! Monitor REST API: endpoint shapes and the transport seam.
//!
//! SYSTEM CONTEXT
//! ==============
//! The API lives elsewhere and exposes three calls, all scoped by the user key:
//!
//! - `GET /monitors?user_key={key}` -> `{ data: [Monitor, ...] }`
//! - `POST /monitors` with a [`NewMonitor`] body -> `{ id, ... }`
//! - `DELETE /monitors/{id}?user_key={key}` -> any success status
//!
//! Non-2xx responses map to [`ApiError::Status`]; a `POST` error body may carry
//! `{ detail }`.

#[cfg(not(target_arch = "wasm32"))]
pub mod http;
pub mod types;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

pub use types::{ApiError, CreatedMonitor, Monitor, MonitorId, NewMonitor};
use url::Url;

use crate::identity::UserKey;

/// Remote monitor operations.
///
/// Implementations run on a single-threaded event loop (browser or CLI), so
/// futures are not required to be `Send`.
#[async_trait::async_trait(?Send)]
pub trait MonitorApi {
    /// List every monitor owned by `user_key`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-success status, or an
    /// unparseable body.
    async fn list(&self, user_key: &UserKey) -> Result<Vec<Monitor>, ApiError>;

    /// Create a monitor and return its server-assigned id.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`]; status errors carry the API's `detail` when
    /// present.
    async fn create(&self, monitor: &NewMonitor) -> Result<CreatedMonitor, ApiError>;

    /// Delete the monitor `id` owned by `user_key`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or non-success status.
    async fn delete(&self, id: &MonitorId, user_key: &UserKey) -> Result<(), ApiError>;
}

// =============================================================================
// ENDPOINTS
// =============================================================================

/// `{base}/monitors`. Trailing slashes on `base` are ignored.
///
/// # Errors
///
/// Returns [`ApiError::InvalidBaseUrl`] if `base` is not an absolute URL that
/// can carry path segments.
pub fn create_url(base: &str) -> Result<Url, ApiError> {
    let mut url =
        Url::parse(base.trim_end_matches('/')).map_err(|e| ApiError::InvalidBaseUrl(format!("{base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| ApiError::InvalidBaseUrl(base.to_owned()))?
        .pop_if_empty()
        .push("monitors");
    Ok(url)
}

/// `{base}/monitors?user_key={key}`.
///
/// # Errors
///
/// See [`create_url`].
pub fn list_url(base: &str, user_key: &UserKey) -> Result<Url, ApiError> {
    let mut url = create_url(base)?;
    url.query_pairs_mut().append_pair("user_key", user_key.as_str());
    Ok(url)
}

/// `{base}/monitors/{id}?user_key={key}`, with `id` encoded as one segment.
///
/// # Errors
///
/// See [`create_url`].
pub fn delete_url(base: &str, id: &MonitorId, user_key: &UserKey) -> Result<Url, ApiError> {
    let mut url = create_url(base)?;
    url.path_segments_mut()
        .map_err(|()| ApiError::InvalidBaseUrl(base.to_owned()))?
        .push(id.as_str());
    url.query_pairs_mut().append_pair("user_key", user_key.as_str());
    Ok(url)
}

/// `true` for 2xx statuses.
#[must_use]
pub fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}
