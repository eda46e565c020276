use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdpError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The page fetch returned a non-2xx status.
    #[error("unexpected HTTP status {status} fetching {url}")]
    UnexpectedStatus { status: u16, url: String },
}

/// The machine-readable error object handed to callers when extraction
/// cannot produce a usable record. Extraction never raises past the
/// component boundary; it yields either a record or one of these.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub error: String,
    pub url: String,
    pub source: &'static str,
}

impl ErrorReport {
    #[must_use]
    pub fn from_pdp(err: &PdpError, url: &str) -> Self {
        Self {
            error: err.to_string(),
            url: url.to_owned(),
            source: "webpage-extractor",
        }
    }

    /// Report for a page that extracted cleanly but exposes no SKU in
    /// structured markup or visible text, making it unusable for
    /// cross-source matching.
    #[must_use]
    pub fn unusable(url: &str) -> Self {
        Self {
            error: "No SKU found on the provided URL. The page does not expose a usable SKU \
                    in structured markup or text, so it cannot be compared with backend \
                    catalog data."
                .to_owned(),
            url: url.to_owned(),
            source: "webpage-extractor",
        }
    }
}
