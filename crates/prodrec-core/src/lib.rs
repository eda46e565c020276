pub mod app_config;
pub mod catalog_record;
pub mod config;
pub mod pdp_record;

pub use app_config::AppConfig;
pub use catalog_record::{
    CatalogOption, CatalogProduct, CatalogRecord, OptionValue, PriceSummary, RawPayloads,
    VariantsView,
};
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use pdp_record::{
    Commercial, Descriptive, Identity, Media, PdpVariant, ProductRecord, Seo, Taxonomy,
    TitleFormat,
};
