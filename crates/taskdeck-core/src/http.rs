use std::time::Duration;

use anyhow::Context;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use taskdeck_shared::{ApiRequest, ApiResponse, FetchError, Method, Transport};
use tracing::{debug, warn};

/// `reqwest`-backed transport rooted at the API base URL.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed building HTTP client for task API")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, FetchError> {
        let url = self.url_for(&request.path);
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, url.as_str())
            .header(AUTHORIZATION, request.authorization.as_str());

        if let Some(body) = request.json_body()? {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = builder.send().await.map_err(|err| {
            warn!(url = %url, error = %err, "task API request failed");
            FetchError::Network(err.to_string())
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| FetchError::Network(format!("failed reading response body: {err}")))?;

        debug!(url = %url, status, bytes = body.len(), "task API responded");
        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::ReqwestTransport;

    #[tokio::test]
    async fn joins_paths_without_double_slash() {
        let transport =
            ReqwestTransport::new("http://localhost:5000/api/", Duration::from_secs(1)).expect("client");
        assert_eq!(transport.base_url(), "http://localhost:5000/api");
        assert_eq!(transport.url_for("/tasks/42"), "http://localhost:5000/api/tasks/42");
    }
}
