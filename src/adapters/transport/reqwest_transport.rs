use std::time::Duration;

use crate::core::errors::{Result, VerseError};
use crate::core::models::request::{HttpResponse, Method, OutboundRequest};
use crate::core::traits::transport::Transport;

/// Default bound on a single request, from start to full response body.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// HTTP transport over a shared reqwest client.
///
/// Paths are joined onto the configured base URL. Any status code the
/// server answers with is returned as a response; only failures to get
/// one at all become errors.
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(format!("verse/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| VerseError::Transport {
                reason: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    fn describe(&self, e: &reqwest::Error) -> String {
        if e.is_timeout() {
            format!("request timed out after {}s", self.timeout.as_secs())
        } else if e.is_connect() {
            format!("connection to {} failed", self.base_url)
        } else {
            e.to_string()
        }
    }
}

impl Transport for ReqwestTransport {
    async fn call(&self, request: OutboundRequest) -> Result<HttpResponse> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, self.url(&request.path));
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| VerseError::Transport {
            reason: self.describe(&e),
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| VerseError::Transport {
            reason: format!("failed to read response body: {}", self.describe(&e)),
        })?;

        Ok(HttpResponse::new(status, body))
    }
}
