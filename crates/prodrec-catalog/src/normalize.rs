//! Reshaping of the two raw service payloads into a [`CatalogRecord`].
//!
//! Normalization is a derived, lossy view: every flattening here keeps the
//! originating object reachable, and the verbatim payloads always land in
//! `raw` regardless of how much of the reshaping succeeded. The backend
//! schema is unversioned, so all field access is shape-tolerant.

use std::collections::BTreeMap;

use prodrec_core::catalog_record::VARIANTS_NOTE;
use prodrec_core::{
    CatalogOption, CatalogProduct, CatalogRecord, OptionValue, PriceSummary, RawPayloads,
    VariantsView,
};
use serde_json::Value;

/// Keys probed, in order, for a list-shaped variants collection at the top
/// level of the `productVariants` payload.
const VARIANT_KEYS: &[&str] = &["variants", "items", "productVariants", "product_variants"];

/// Keys probed under a `data` sub-object when no top-level key matched.
const NESTED_VARIANT_KEYS: &[&str] = &["variants", "items"];

/// Combines both query payloads into one [`CatalogRecord`], consuming the
/// payloads so they can be stored verbatim under `raw`.
#[must_use]
pub fn organize(sku: &str, product_data: Value, product_variants: Value) -> CatalogRecord {
    let products: Vec<CatalogProduct> = product_data
        .get("products")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter(|p| p.is_object())
                .map(normalize_product)
                .collect()
        })
        .unwrap_or_default();

    let variants = normalize_variants(&product_variants);

    CatalogRecord {
        sku: sku.to_owned(),
        product_data_message: string_field(&product_data, "message"),
        product_variants_message: string_field(&product_variants, "message"),
        products_count: products.len(),
        products,
        variants,
        raw: RawPayloads {
            product_data,
            product_variants,
        },
    }
}

fn normalize_product(p: &Value) -> CatalogProduct {
    CatalogProduct {
        sku: p.get("sku").and_then(value_as_string),
        name: string_field(p, "name"),
        short_description: string_field(p, "shortDescription"),
        description_html: string_field(p, "description"),
        in_stock: bool_field(p, "inStock"),
        add_to_cart_allowed: bool_field(p, "addToCartAllowed"),
        low_stock: bool_field(p, "lowStock"),
        attributes: flatten_attributes(p.get("attributes")),
        images: flatten_images(p.get("images")),
        options: group_options(p.get("options")),
        price: price_summary(p.get("priceRange")),
        raw: p.clone(),
    }
}

/// Flattens the attribute list into a name → value map. Entries without a
/// name are skipped; duplicate names keep the last occurrence.
fn flatten_attributes(attributes: Option<&Value>) -> BTreeMap<String, Value> {
    let mut map = BTreeMap::new();
    for attr in iter_objects(attributes) {
        let Some(name) = attr.get("name").and_then(Value::as_str) else {
            continue;
        };
        let value = attr.get("value").cloned().unwrap_or(Value::Null);
        map.insert(name.to_owned(), value);
    }
    map
}

/// Flattens nested image objects into a flat URL list, dropping entries
/// without a URL.
fn flatten_images(images: Option<&Value>) -> Vec<String> {
    iter_objects(images)
        .filter_map(|img| img.get("url").and_then(Value::as_str))
        .filter(|url| !url.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Groups options by their id. Options without an id are skipped; each
/// grouped entry retains the original option object for fidelity.
fn group_options(options: Option<&Value>) -> BTreeMap<String, CatalogOption> {
    let mut map = BTreeMap::new();
    for opt in iter_objects(options) {
        let Some(id) = opt.get("id").and_then(value_as_string) else {
            continue;
        };

        let values = iter_objects(opt.get("values"))
            .map(|v| OptionValue {
                title: string_field(v, "title"),
                value: v.get("value").cloned(),
                in_stock: bool_field(v, "inStock"),
                kind: string_field(v, "type"),
                id: v.get("id").and_then(value_as_string),
            })
            .collect();

        map.insert(
            id,
            CatalogOption {
                title: string_field(opt, "title"),
                multi: bool_field(opt, "multi"),
                required: bool_field(opt, "required"),
                values,
                raw: opt.clone(),
            },
        );
    }
    map
}

/// Walks `priceRange.{minimum,maximum}.{final,regular}.amount` for the
/// price bounds. Currency resolution order: minimum-final, minimum-regular,
/// maximum-final, maximum-regular — first non-null wins.
fn price_summary(range: Option<&Value>) -> PriceSummary {
    let Some(range) = range.filter(|r| r.is_object()) else {
        return PriceSummary::default();
    };
    let minimum = range.get("minimum");
    let maximum = range.get("maximum");

    PriceSummary {
        currency: amount_currency(minimum, "final")
            .or_else(|| amount_currency(minimum, "regular"))
            .or_else(|| amount_currency(maximum, "final"))
            .or_else(|| amount_currency(maximum, "regular")),
        min_final: amount_value(minimum, "final"),
        min_regular: amount_value(minimum, "regular"),
        max_final: amount_value(maximum, "final"),
        max_regular: amount_value(maximum, "regular"),
    }
}

fn amount_node<'a>(node: Option<&'a Value>, kind: &str) -> Option<&'a Value> {
    node?.get(kind)?.get("amount")
}

fn amount_value(node: Option<&Value>, kind: &str) -> Option<f64> {
    amount_node(node, kind)?.get("value")?.as_f64()
}

fn amount_currency(node: Option<&Value>, kind: &str) -> Option<String> {
    amount_node(node, kind)?
        .get("currency")?
        .as_str()
        .map(str::to_owned)
}

/// Best-effort variants view: the first list-shaped value found by the key
/// probe wins; an unrecognized shape yields an empty view (count 0) with
/// the raw payload untouched. The probe list is a known, documented
/// limitation; extend it when a real backend shape warrants it.
fn normalize_variants(payload: &Value) -> VariantsView {
    for key in VARIANT_KEYS {
        if let Some(items) = payload.get(key).and_then(Value::as_array) {
            return VariantsView {
                count: items.len(),
                items: Some(items.clone()),
                note: VARIANTS_NOTE.to_owned(),
            };
        }
    }

    if let Some(data) = payload.get("data").filter(|d| d.is_object()) {
        for key in NESTED_VARIANT_KEYS {
            if let Some(items) = data.get(key).and_then(Value::as_array) {
                return VariantsView {
                    count: items.len(),
                    items: Some(items.clone()),
                    note: VARIANTS_NOTE.to_owned(),
                };
            }
        }
    }

    VariantsView {
        count: 0,
        items: None,
        note: VARIANTS_NOTE.to_owned(),
    }
}

fn string_field(obj: &Value, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_owned)
}

fn bool_field(obj: &Value, key: &str) -> Option<bool> {
    obj.get(key).and_then(Value::as_bool)
}

/// Coerces a scalar to its string form; identifiers arrive as either
/// strings or numbers depending on the backend version.
fn value_as_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Iterates a field expected to hold a list of objects, tolerating absence
/// and skipping non-object entries.
fn iter_objects(value: Option<&Value>) -> impl Iterator<Item = &Value> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter(|v| v.is_object()))
        .into_iter()
        .flatten()
}
