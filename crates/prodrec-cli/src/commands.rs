//! Subcommand implementations.
//!
//! Every command prints exactly one JSON document to stdout: the record on
//! success, or the pipeline's structured error object on failure. The exit
//! code distinguishes the two for shell callers; the output shape never
//! requires exception handling downstream.

use anyhow::Context;
use prodrec_catalog::CatalogClient;
use prodrec_core::AppConfig;
use prodrec_pdp::PdpClient;
use serde_json::json;

/// Extracts one product detail page and prints the record.
pub async fn run_pdp(config: &AppConfig, url: &str) -> anyhow::Result<i32> {
    let client = PdpClient::from_config(config)?;
    match client.extract(url).await {
        Ok(record) if record.is_usable() => {
            print_json(&record)?;
            Ok(0)
        }
        Ok(_) => {
            tracing::warn!(%url, "extracted record has no derivable SKU");
            print_json(&prodrec_pdp::ErrorReport::unusable(url))?;
            Ok(1)
        }
        Err(err) => {
            print_json(&prodrec_pdp::ErrorReport::from_pdp(&err, url))?;
            Ok(1)
        }
    }
}

/// Fetches one backend catalog record and prints it.
pub async fn run_catalog(config: &AppConfig, sku: &str) -> anyhow::Result<i32> {
    let client = CatalogClient::new(config)?;
    match client.fetch_product(sku).await {
        Ok(record) => {
            print_json(&record)?;
            Ok(0)
        }
        Err(err) => {
            print_json(&prodrec_catalog::ErrorReport::from_catalog(&err, sku))?;
            Ok(1)
        }
    }
}

/// Runs both pipelines back to back: the page's `normalized_sku` drives the
/// backend lookup, and the two records print side by side for the
/// downstream comparison stage.
pub async fn run_reconcile(config: &AppConfig, url: &str) -> anyhow::Result<i32> {
    let pdp_client = PdpClient::from_config(config)?;
    let record = match pdp_client.extract(url).await {
        Ok(record) => record,
        Err(err) => {
            print_json(&prodrec_pdp::ErrorReport::from_pdp(&err, url))?;
            return Ok(1);
        }
    };

    let Some(sku) = record.identity.normalized_sku.clone() else {
        print_json(&prodrec_pdp::ErrorReport::unusable(url))?;
        return Ok(1);
    };

    let catalog_client = CatalogClient::new(config)?;
    match catalog_client.fetch_product(&sku).await {
        Ok(catalog) => {
            print_json(&json!({"pdp": record, "catalog": catalog}))?;
            Ok(0)
        }
        Err(err) => {
            print_json(&prodrec_catalog::ErrorReport::from_catalog(&err, &sku))?;
            Ok(1)
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    let rendered =
        serde_json::to_string_pretty(value).context("failed to serialize output as JSON")?;
    println!("{rendered}");
    Ok(())
}
