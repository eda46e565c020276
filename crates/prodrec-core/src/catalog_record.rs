//! The normalized view of the backend catalog service's responses for one
//! SKU.
//!
//! Normalized fields are a derived, lossy convenience view; the verbatim
//! service payloads under [`RawPayloads`] remain the source of truth and are
//! always populated when the corresponding remote call succeeded.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Explanatory note attached to every [`VariantsView`].
pub const VARIANTS_NOTE: &str = "Best-effort normalization of the productVariants response. \
     See raw.product_variants for full fidelity.";

/// Combined, reshaped result of the `productData` and `productVariants`
/// queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// The SKU the lookup was invoked with.
    pub sku: String,
    /// Service-supplied status text from the `productData` response.
    pub product_data_message: Option<String>,
    /// Service-supplied status text from the `productVariants` response.
    pub product_variants_message: Option<String>,
    pub products_count: usize,
    pub products: Vec<CatalogProduct>,
    pub variants: VariantsView,
    pub raw: RawPayloads,
}

/// One backend product entry, flattened from the service's list/nested
/// shapes into lookup-friendly maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub short_description: Option<String>,
    pub description_html: Option<String>,
    pub in_stock: Option<bool>,
    pub add_to_cart_allowed: Option<bool>,
    pub low_stock: Option<bool>,
    /// Attribute name → value, flattened from the service's attribute list.
    /// Duplicate names keep the last occurrence.
    pub attributes: BTreeMap<String, Value>,
    /// Flat image URL list; entries without a URL are dropped.
    pub images: Vec<String>,
    /// Options grouped by option id. The backend option schema is
    /// unversioned, so each entry also retains the original object.
    pub options: BTreeMap<String, CatalogOption>,
    pub price: PriceSummary,
    /// The product entry exactly as the service returned it.
    pub raw: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogOption {
    pub title: Option<String>,
    /// Whether the option accepts multiple selections.
    pub multi: Option<bool>,
    pub required: Option<bool>,
    pub values: Vec<OptionValue>,
    /// The full option object, verbatim.
    pub raw: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionValue {
    pub title: Option<String>,
    pub value: Option<Value>,
    pub in_stock: Option<bool>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub id: Option<String>,
}

/// Price bounds derived from the service's `priceRange` tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PriceSummary {
    pub currency: Option<String>,
    pub min_final: Option<f64>,
    pub min_regular: Option<f64>,
    pub max_final: Option<f64>,
    pub max_regular: Option<f64>,
}

/// Best-effort normalized variants. May be empty even when the raw payload
/// contains variant data in a shape the probe list does not recognize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantsView {
    pub count: usize,
    pub items: Option<Vec<Value>>,
    pub note: String,
}

/// Verbatim service responses for both queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPayloads {
    pub product_data: Value,
    pub product_variants: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_value_kind_serializes_as_type() {
        let v = OptionValue {
            title: Some("Red".to_string()),
            value: Some(serde_json::json!("red")),
            in_stock: Some(true),
            kind: Some("swatch".to_string()),
            id: Some("color-red".to_string()),
        };
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["type"], serde_json::json!("swatch"));
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn price_summary_defaults_to_all_none() {
        let p = PriceSummary::default();
        assert!(p.currency.is_none());
        assert!(p.min_final.is_none());
        assert!(p.max_regular.is_none());
    }
}
