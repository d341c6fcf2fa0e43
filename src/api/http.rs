//! Native HTTP transport for the monitor API (`reqwest`).

use std::time::Duration;

use super::types::{parse_created_response, parse_list_response};
use super::{ApiError, CreatedMonitor, Monitor, MonitorApi, MonitorId, NewMonitor};
use crate::config::ClientConfig;
use crate::identity::UserKey;

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpMonitorApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpMonitorApi {
    /// Build a client for `config.api_url` with the configured timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot address the monitor endpoints or
    /// the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        super::create_url(&config.api_url)?;

        let mut builder =
            reqwest::Client::builder().connect_timeout(Duration::from_secs(config.timeouts.connect_secs));
        if let Some(secs) = config.timeouts.request_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;

        Ok(Self { http, base_url: config.api_url.clone() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Read status and body text, mapping non-2xx to [`ApiError::Status`].
///
/// An error body that cannot be read still yields the status.
async fn read_body(response: reqwest::Response) -> Result<String, ApiError> {
    let status = response.status().as_u16();
    if !super::is_success(status) {
        let text = response.text().await.unwrap_or_default();
        return Err(ApiError::from_status(status, &text));
    }

    response
        .text()
        .await
        .map_err(|e| ApiError::Request(e.to_string()))
}

#[async_trait::async_trait(?Send)]
impl MonitorApi for HttpMonitorApi {
    async fn list(&self, user_key: &UserKey) -> Result<Vec<Monitor>, ApiError> {
        let url = super::list_url(&self.base_url, user_key)?;
        let response = self
            .http
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let text = read_body(response).await?;
        parse_list_response(&text)
    }

    async fn create(&self, monitor: &NewMonitor) -> Result<CreatedMonitor, ApiError> {
        let url = super::create_url(&self.base_url)?;
        let response = self
            .http
            .post(url.as_str())
            .json(monitor)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let text = read_body(response).await?;
        parse_created_response(&text)
    }

    async fn delete(&self, id: &MonitorId, user_key: &UserKey) -> Result<(), ApiError> {
        let url = super::delete_url(&self.base_url, id, user_key)?;
        let response = self
            .http
            .delete(url.as_str())
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        read_body(response).await.map(|_| ())
    }
}
