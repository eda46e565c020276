//! HTTP client for fetching product detail pages.

use std::time::Duration;

use prodrec_core::AppConfig;
use prodrec_core::ProductRecord;
use reqwest::Client;

use crate::error::PdpError;
use crate::extract::extract_from_html;

/// Fetches storefront pages with a browser-realistic identity and turns them
/// into [`ProductRecord`]s.
///
/// Each call is an independent, single-shot fetch: no caching, no retries.
/// Transient failures surface immediately so the caller can decide whether
/// to try again.
pub struct PdpClient {
    client: Client,
}

impl PdpClient {
    /// Creates a `PdpClient` with the given fetch timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`PdpError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, PdpError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Creates a `PdpClient` from the application config.
    ///
    /// # Errors
    ///
    /// Returns [`PdpError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, PdpError> {
        Self::new(config.pdp_fetch_timeout_secs, &config.pdp_user_agent)
    }

    /// Fetches `url` and extracts a [`ProductRecord`] from its HTML.
    ///
    /// Only the fetch itself can fail; every per-field extraction failure
    /// degrades to an empty field instead of propagating.
    ///
    /// # Errors
    ///
    /// - [`PdpError::UnexpectedStatus`] — the server answered with a
    ///   non-2xx status.
    /// - [`PdpError::Http`] — network or TLS failure.
    pub async fn extract(&self, url: &str) -> Result<ProductRecord, PdpError> {
        let html = self.fetch_page(url).await?;
        Ok(extract_from_html(url, &html))
    }

    async fn fetch_page(&self, url: &str) -> Result<String, PdpError> {
        let response = self
            .client
            .get(url)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PdpError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        Ok(response.text().await?)
    }
}
