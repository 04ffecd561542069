//! HTTP client for the dataops service.
//!
//! One reqwest client, one base URL, one timeout. Failures are split the
//! only way the caller can act on: the request never completed
//! (`Transport`), the service answered with a non-success status
//! (`Status`), or the body was not the JSON we were promised (`Decode`).

use std::time::Duration;

use frontdesk::{BackendError, BackendResult};
use serde_json::Value;
use tracing::{debug, error};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct DataOpsClient {
    base_url: String,
    client: reqwest::Client,
}

impl DataOpsClient {
    /// Client with the default 30 second request timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Self { base_url, client }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) async fn get(&self, path: &str, query: &[(&str, &str)]) -> BackendResult<Value> {
        let url = self.url(path);
        debug!("[DataOpsClient] GET {}", url);

        let mut request = self.client.get(&url);
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request
            .send()
            .await
            .map_err(|e| transport_error("GET", &url, &e))?;
        Self::handle_response(response, &url).await
    }

    pub(crate) async fn post(&self, path: &str, body: &Value) -> BackendResult<Value> {
        let url = self.url(path);
        debug!("[DataOpsClient] POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error("POST", &url, &e))?;
        Self::handle_response(response, &url).await
    }

    pub(crate) async fn put(&self, path: &str, body: &Value) -> BackendResult<Value> {
        let url = self.url(path);
        debug!("[DataOpsClient] PUT {}", url);

        let response = self
            .client
            .put(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error("PUT", &url, &e))?;
        Self::handle_response(response, &url).await
    }

    /// DELETE carries no response body; only the status matters.
    pub(crate) async fn delete(&self, path: &str) -> BackendResult<()> {
        let url = self.url(path);
        debug!("[DataOpsClient] DELETE {}", url);

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| transport_error("DELETE", &url, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("[DataOpsClient] HTTP {} from {}", status.as_u16(), url);
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: truncate(body),
            });
        }
        Ok(())
    }

    async fn handle_response(response: reqwest::Response, url: &str) -> BackendResult<Value> {
        let status = response.status();
        let text = response.text().await.map_err(|e| BackendError::Transport {
            message: format!("failed to read response body from {url}: {e}"),
        })?;

        if !status.is_success() {
            error!("[DataOpsClient] HTTP {} from {}", status.as_u16(), url);
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: truncate(text),
            });
        }

        serde_json::from_str(&text).map_err(|e| BackendError::Decode {
            message: format!("invalid JSON from {url}: {e}"),
        })
    }
}

fn transport_error(method: &str, url: &str, err: &reqwest::Error) -> BackendError {
    let kind = if err.is_timeout() {
        "timeout"
    } else if err.is_connect() {
        "connection error"
    } else {
        "request error"
    };
    error!("[DataOpsClient] {} {} failed: {}: {}", method, url, kind, err);
    BackendError::Transport {
        message: format!("{method} {url}: {kind}: {err}"),
    }
}

fn truncate(body: String) -> String {
    if body.chars().count() > 500 {
        let head: String = body.chars().take(500).collect();
        format!("{head}... (truncated)")
    } else {
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_trimmed_from_the_base_url() {
        let client = DataOpsClient::new("https://dataops.example.com///");
        assert_eq!(
            client.url("/dataops/chains"),
            "https://dataops.example.com/dataops/chains"
        );
    }

    #[test]
    fn long_error_bodies_are_truncated() {
        let body = "x".repeat(600);
        let shown = truncate(body);
        assert!(shown.ends_with("... (truncated)"));
        assert!(shown.chars().count() < 520);
    }
}
