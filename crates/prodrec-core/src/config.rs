use thiserror::Error;

use crate::app_config::AppConfig;

/// Default catalog RPC endpoint, used when `PRODREC_CATALOG_ENDPOINT` is not
/// set. Deployments point this at their own commerce backend.
pub const DEFAULT_CATALOG_ENDPOINT: &str = "https://commerce-mcp.example.com/mcp";

/// Default `User-Agent` for page fetches. Storefronts routinely block
/// non-browser agents, so this mimics a current desktop Chrome.
pub const DEFAULT_PDP_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a set env var holds an unparsable value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for
/// testing or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a set env var holds an unparsable value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual
/// environment so it can be tested with a pure `HashMap` lookup — no
/// `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let catalog_endpoint = or_default("PRODREC_CATALOG_ENDPOINT", DEFAULT_CATALOG_ENDPOINT);
    let pdp_fetch_timeout_secs = parse_u64("PRODREC_PDP_FETCH_TIMEOUT_SECS", "20")?;
    let pdp_user_agent = or_default("PRODREC_PDP_USER_AGENT", DEFAULT_PDP_USER_AGENT);
    let catalog_init_timeout_secs = parse_u64("PRODREC_CATALOG_INIT_TIMEOUT_SECS", "10")?;
    let catalog_query_timeout_secs = parse_u64("PRODREC_CATALOG_QUERY_TIMEOUT_SECS", "20")?;
    let catalog_variants_timeout_secs = parse_u64("PRODREC_CATALOG_VARIANTS_TIMEOUT_SECS", "25")?;
    let catalog_close_timeout_secs = parse_u64("PRODREC_CATALOG_CLOSE_TIMEOUT_SECS", "5")?;

    Ok(AppConfig {
        catalog_endpoint,
        pdp_fetch_timeout_secs,
        pdp_user_agent,
        catalog_init_timeout_secs,
        catalog_query_timeout_secs,
        catalog_variants_timeout_secs,
        catalog_close_timeout_secs,
    })
}
