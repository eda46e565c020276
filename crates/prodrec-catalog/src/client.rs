//! Stateful session client for the remote catalog RPC service.
//!
//! Each lookup runs the full session lifecycle:
//!
//! ```text
//! UNINITIALIZED → SESSION_OPEN → QUERY_PRIMARY → QUERY_VARIANTS → CLOSED
//! ```
//!
//! The session is scoped to one invocation and never shared: concurrent
//! lookups each open their own session. Teardown is attempted exactly once
//! whenever a session id was obtained, including after a failed query, and
//! its own failure is swallowed so cleanup can never mask the primary
//! outcome.

use std::time::Duration;

use prodrec_core::{AppConfig, CatalogRecord};
use reqwest::Client;
use serde_json::{json, Value};

use crate::envelope;
use crate::error::CatalogError;
use crate::normalize;

/// Request/response header carrying the session id. Header lookup is
/// case-insensitive, so servers answering `Mcp-Session-Id` match too.
const SESSION_HEADER: &str = "mcp-session-id";

const PROTOCOL_VERSION: &str = "2024-11-05";
const CLIENT_NAME: &str = "prodrec";

/// Client for the catalog RPC service.
///
/// Holds the HTTP client, endpoint, and per-call timeouts. Use
/// [`CatalogClient::new`] for production or [`CatalogClient::with_endpoint`]
/// to point at a mock server in tests.
pub struct CatalogClient {
    client: Client,
    endpoint: String,
    init_timeout: Duration,
    query_timeout: Duration,
    variants_timeout: Duration,
    close_timeout: Duration,
}

impl CatalogClient {
    /// Creates a client pointed at the configured catalog endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: &AppConfig) -> Result<Self, CatalogError> {
        Self::with_endpoint(&config.catalog_endpoint, config)
    }

    /// Creates a client with an explicit endpoint (for testing with
    /// wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_endpoint(endpoint: &str, config: &AppConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("{CLIENT_NAME}/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_owned(),
            init_timeout: Duration::from_secs(config.catalog_init_timeout_secs),
            query_timeout: Duration::from_secs(config.catalog_query_timeout_secs),
            variants_timeout: Duration::from_secs(config.catalog_variants_timeout_secs),
            close_timeout: Duration::from_secs(config.catalog_close_timeout_secs),
        })
    }

    /// Looks up a SKU: opens a session, runs the `productData` and
    /// `productVariants` queries, normalizes the combined result, and
    /// guarantees session teardown on every exit path.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::MissingSessionId`] — initialize succeeded but
    ///   returned no session id; nothing further is attempted.
    /// - [`CatalogError::UnexpectedStatus`] — a call answered non-2xx.
    /// - [`CatalogError::ResponseShape`] — a query's envelope did not
    ///   contain the expected nested payload.
    /// - [`CatalogError::Http`] — network or TLS failure.
    pub async fn fetch_product(&self, sku: &str) -> Result<CatalogRecord, CatalogError> {
        let session_id = self.initialize().await?;
        tracing::debug!(%sku, "catalog session opened");

        // Hold the query outcome so teardown runs before we propagate it.
        let queries = self.run_queries(&session_id, sku).await;
        self.close_session(&session_id).await;

        let (product_data, product_variants) = queries?;
        Ok(normalize::organize(sku, product_data, product_variants))
    }

    async fn run_queries(
        &self,
        session_id: &str,
        sku: &str,
    ) -> Result<(Value, Value), CatalogError> {
        let product_data = self
            .call_tool(session_id, 3, "productData", sku, self.query_timeout)
            .await?;
        let product_variants = self
            .call_tool(session_id, 4, "productVariants", sku, self.variants_timeout)
            .await?;
        Ok((product_data, product_variants))
    }

    /// `UNINITIALIZED → SESSION_OPEN`: the session id arrives in a response
    /// header of the `initialize` call.
    async fn initialize(&self) -> Result<String, CatalogError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": {
                    "name": CLIENT_NAME,
                    "version": env!("CARGO_PKG_VERSION"),
                },
            },
        });

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.init_timeout)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::UnexpectedStatus {
                status: status.as_u16(),
                operation: "initialize".to_owned(),
            });
        }

        response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .filter(|id| !id.is_empty())
            .ok_or(CatalogError::MissingSessionId)
    }

    /// Invokes one named operation within the session and unwraps its
    /// nested text payload.
    async fn call_tool(
        &self,
        session_id: &str,
        rpc_id: u64,
        operation: &str,
        sku: &str,
        timeout: Duration,
    ) -> Result<Value, CatalogError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": rpc_id,
            "method": "tools/call",
            "params": {
                "name": operation,
                "arguments": {"sku": sku},
            },
        });

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(timeout)
            .header(SESSION_HEADER, session_id)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::UnexpectedStatus {
                status: status.as_u16(),
                operation: operation.to_owned(),
            });
        }

        let body = response.text().await?;
        let body: Value =
            serde_json::from_str(&body).map_err(|e| CatalogError::ResponseShape {
                operation: operation.to_owned(),
                reason: format!("response body is not valid JSON: {e}"),
            })?;

        envelope::unwrap_text_payload(body, operation)
    }

    /// Any state `→ CLOSED`: fire-and-forget teardown. Failures are logged
    /// and swallowed so they cannot overwrite the primary result or error.
    async fn close_session(&self, session_id: &str) {
        let result = self
            .client
            .delete(&self.endpoint)
            .timeout(self.close_timeout)
            .header(SESSION_HEADER, session_id)
            .send()
            .await;

        match result {
            Ok(response) if !response.status().is_success() => {
                tracing::debug!(status = %response.status(), "session teardown answered non-2xx (ignored)");
            }
            Ok(_) => {}
            Err(err) => {
                tracing::debug!(error = %err, "session teardown failed (ignored)");
            }
        }
    }
}
