//! HTTP client wrapping reqwest.
//!
//! One client is built per run and shared by reference with every catalog
//! query and download. It carries a fixed User-Agent and applies separate
//! timeouts to page fetches and file downloads. No retries.

use std::time::Duration;

use tracing::debug;

use crate::types::{ScoutError, ScoutResult};

/// Desktop browser identification sent with every request.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Connection settings for [`HttpClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub user_agent: String,
    /// Timeout for catalog search pages.
    pub search_timeout: Duration,
    /// Idle timeout for streamed file downloads: the longest wait for the
    /// response headers or for the next body chunk.
    pub download_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            search_timeout: Duration::from_secs(10),
            download_timeout: Duration::from_secs(30),
        }
    }
}

/// Response from a buffered GET request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Original requested URL.
    pub url: String,
    /// Final URL after redirects.
    pub final_url: String,
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

/// HTTP client shared by catalog adapters and downloads.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpClient {
    /// Create a client from the given settings.
    pub fn new(config: ClientConfig) -> ScoutResult<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// GET a page and buffer its body. Non-2xx statuses are errors.
    pub async fn fetch_page(&self, url: &str) -> ScoutResult<HttpResponse> {
        debug!(%url, "fetching page");

        let r = self
            .client
            .get(url)
            .timeout(self.config.search_timeout)
            .send()
            .await?;

        let status = r.status();
        let final_url = r.url().to_string();

        if !status.is_success() {
            return Err(ScoutError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = r.text().await?;

        Ok(HttpResponse {
            url: url.to_string(),
            final_url,
            status: status.as_u16(),
            body,
        })
    }

    /// GET a resource without buffering the body.
    ///
    /// Only the wait for the response headers is bounded here; the body
    /// has no overall deadline, so callers bound each chunk read with
    /// [`ClientConfig::download_timeout`]. The status is left for the
    /// caller to check.
    pub async fn fetch_stream(&self, url: &str) -> ScoutResult<reqwest::Response> {
        debug!(%url, "opening download stream");

        let idle = self.config.download_timeout;
        let r = tokio::time::timeout(idle, self.client.get(url).send())
            .await
            .map_err(|_| ScoutError::Timeout {
                url: url.to_string(),
                after: idle,
            })??;

        Ok(r)
    }
}
