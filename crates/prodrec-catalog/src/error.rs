use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered a call with a non-2xx status.
    #[error("unexpected HTTP status {status} from {operation}")]
    UnexpectedStatus { status: u16, operation: String },

    /// The `initialize` response did not carry a session id header. Fatal:
    /// no further calls are possible without a session.
    #[error("session id header missing in initialize response")]
    MissingSessionId,

    /// A call's envelope did not contain the expected nested text payload,
    /// or that payload was not valid JSON.
    #[error("unexpected response shape from {operation}: {reason}")]
    ResponseShape { operation: String, reason: String },
}

/// The machine-readable error object handed to callers when a lookup fails
/// at any state-machine step.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub error: String,
    pub sku: String,
    pub source: &'static str,
}

impl ErrorReport {
    #[must_use]
    pub fn from_catalog(err: &CatalogError, sku: &str) -> Self {
        Self {
            error: err.to_string(),
            sku: sku.to_owned(),
            source: "catalog-session-client",
        }
    }
}
