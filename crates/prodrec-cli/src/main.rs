use clap::{Parser, Subcommand};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "prodrec")]
#[command(about = "Reconciles product data between storefront pages and the backend catalog")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract a normalized product record from a product detail page URL.
    Pdp {
        url: String,
        /// Override the page fetch timeout in seconds.
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Fetch the backend catalog record for a SKU.
    Catalog {
        sku: String,
        /// Override the catalog service endpoint.
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Extract a page, then fetch the backend record for its derived SKU.
    Reconcile {
        url: String,
        /// Override the catalog service endpoint.
        #[arg(long)]
        endpoint: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = prodrec_core::load_app_config_from_env()?;

    let exit_code = match cli.command {
        Commands::Pdp { url, timeout_secs } => {
            if let Some(secs) = timeout_secs {
                config.pdp_fetch_timeout_secs = secs;
            }
            commands::run_pdp(&config, &url).await?
        }
        Commands::Catalog { sku, endpoint } => {
            if let Some(endpoint) = endpoint {
                config.catalog_endpoint = endpoint;
            }
            commands::run_catalog(&config, &sku).await?
        }
        Commands::Reconcile { url, endpoint } => {
            if let Some(endpoint) = endpoint {
                config.catalog_endpoint = endpoint;
            }
            commands::run_reconcile(&config, &url).await?
        }
    };

    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}
