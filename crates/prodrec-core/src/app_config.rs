/// Runtime configuration shared by both extraction pipelines.
///
/// Loaded from environment variables by [`crate::config::load_app_config`];
/// every field has a default so a bare environment still produces a working
/// config pointed at the production catalog endpoint.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base endpoint of the remote catalog RPC service.
    pub catalog_endpoint: String,
    /// Timeout for fetching a product detail page, in seconds.
    pub pdp_fetch_timeout_secs: u64,
    /// `User-Agent` sent when fetching product detail pages.
    pub pdp_user_agent: String,
    /// Timeout for the catalog `initialize` call, in seconds.
    pub catalog_init_timeout_secs: u64,
    /// Timeout for the `productData` query, in seconds.
    pub catalog_query_timeout_secs: u64,
    /// Timeout for the `productVariants` query, in seconds. Larger than the
    /// primary query timeout because variant payloads are bigger.
    pub catalog_variants_timeout_secs: u64,
    /// Timeout for the session teardown request, in seconds.
    pub catalog_close_timeout_secs: u64,
}
