//! The normalized view of one product detail page, as extracted from live
//! storefront HTML.
//!
//! A record is built once per fetch and never mutated afterwards. Structured
//! markup (JSON-LD) is the preferred source for every field; HTML heuristics
//! only fill fields the markup left empty. `raw_structured_data` keeps the
//! original JSON-LD object verbatim so downstream consumers can audit what
//! the normalization saw.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A product detail page reduced to a schema-aligned record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub identity: Identity,
    pub descriptive: Descriptive,
    pub commercial: Commercial,
    pub media: Media,
    pub taxonomy: Taxonomy,
    /// `additionalProperty` name/value pairs from structured markup. Values
    /// stay as raw JSON (scalar or list); duplicate names keep the last
    /// occurrence.
    pub extended_attributes: BTreeMap<String, Value>,
    /// Variant sub-records; populated only for grouped products.
    pub variants: Vec<PdpVariant>,
    pub seo: Seo,
    /// The `@type` of the structured product object (`"Product"` or
    /// `"ProductGroup"`), when one was found.
    pub product_type: Option<String>,
    /// The structured product object exactly as it appeared on the page.
    pub raw_structured_data: Option<Value>,
}

impl ProductRecord {
    /// `true` when the record carries a SKU usable for cross-source matching.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.identity.normalized_sku.is_some()
    }
}

/// Identifiers for the page and the product it describes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// The URL the extraction was invoked with.
    pub url: String,
    /// `@id` from structured markup, else the invocation URL.
    pub canonical_url: Option<String>,
    /// SKU from structured markup.
    pub sku: Option<String>,
    /// Product code recovered from visible page text (`"SKU: ..."` /
    /// `"Product Code: ..."` labels), falling back to the structured SKU.
    pub product_code: Option<String>,
    /// The canonical identifier: `sku` when present, else `product_code`.
    pub normalized_sku: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptive {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Raw markup of the on-page description block, when one was found.
    pub description_html: Option<String>,
    /// Flattened text of the on-page description block.
    pub description_plain: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commercial {
    pub price: Option<f64>,
    /// ISO 4217 code (e.g. `"USD"`).
    pub price_currency: Option<String>,
    /// Pre-discount list price, when shown.
    pub original_price: Option<f64>,
    pub original_price_currency: Option<String>,
    /// Availability as stated by the page, typically a schema.org URL such
    /// as `"https://schema.org/InStock"`.
    pub availability: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    /// Image URLs, deduplicated, in page order.
    pub images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Taxonomy {
    /// Breadcrumb trail texts, deduplicated, in page order.
    pub breadcrumbs: Vec<String>,
}

/// One variant of a grouped product, mapped from `hasVariant` entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdpVariant {
    pub sku: Option<String>,
    pub name: Option<String>,
    /// Image reference as it appeared in the markup (string or list).
    pub image: Option<Value>,
    pub price: Option<f64>,
    pub price_currency: Option<String>,
    pub availability: Option<String>,
    /// The variant's offer objects, verbatim.
    pub offers: Vec<Value>,
}

/// Page-level SEO fields, extracted independently of structured markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seo {
    pub title_tag: Option<String>,
    pub meta_description: Option<String>,
    pub h1: Option<String>,
    pub canonical: Option<String>,
    pub robots: Option<String>,
    pub page_lang: Option<String>,
    pub title_format: TitleFormat,
    pub title_format_notes: Option<String>,
}

/// Separator convention detected in the page's `<title>` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TitleFormat {
    Pipe,
    Dash,
    #[default]
    None,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_record(normalized_sku: Option<&str>) -> ProductRecord {
        ProductRecord {
            identity: Identity {
                url: "https://shop.example.com/p/1".to_string(),
                canonical_url: None,
                sku: None,
                product_code: None,
                normalized_sku: normalized_sku.map(str::to_owned),
            },
            descriptive: Descriptive {
                title: None,
                description: None,
                description_html: None,
                description_plain: None,
            },
            commercial: Commercial {
                price: None,
                price_currency: None,
                original_price: None,
                original_price_currency: None,
                availability: None,
            },
            media: Media { images: vec![] },
            taxonomy: Taxonomy {
                breadcrumbs: vec![],
            },
            extended_attributes: BTreeMap::new(),
            variants: vec![],
            seo: Seo {
                title_tag: None,
                meta_description: None,
                h1: None,
                canonical: None,
                robots: None,
                page_lang: None,
                title_format: TitleFormat::None,
                title_format_notes: None,
            },
            product_type: None,
            raw_structured_data: None,
        }
    }

    #[test]
    fn usable_requires_normalized_sku() {
        assert!(empty_record(Some("ADB366")).is_usable());
        assert!(!empty_record(None).is_usable());
    }

    #[test]
    fn title_format_serializes_lowercase() {
        let v = serde_json::to_value(TitleFormat::Pipe).unwrap();
        assert_eq!(v, serde_json::json!("pipe"));
        let v = serde_json::to_value(TitleFormat::None).unwrap();
        assert_eq!(v, serde_json::json!("none"));
    }

    #[test]
    fn record_round_trips_through_json() {
        let record = empty_record(Some("SKU-1"));
        let json = serde_json::to_string(&record).unwrap();
        let back: ProductRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
