//! JSON-LD structured-data extraction.
//!
//! Pages embed product metadata in `script[type="application/ld+json"]`
//! blocks. The markup is treated as an external, versionless, best-effort
//! schema: blocks that fail to parse are discarded without aborting, and
//! every field access tolerates absence or unexpected shapes.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use prodrec_core::PdpVariant;
use scraper::{Html, Selector};
use serde_json::Value;

static LD_JSON_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("valid selector")
});

/// Collects every parsable JSON-LD object on the page, in document order.
/// Array-shaped blocks contribute each of their object elements.
pub(crate) fn collect_objects(doc: &Html) -> Vec<Value> {
    let mut objects = Vec::new();

    for script in doc.select(&LD_JSON_SELECTOR) {
        let raw = script.text().collect::<String>();
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }

        let Some(data) = lenient_parse(raw) else {
            tracing::debug!("discarding unparsable ld+json block");
            continue;
        };

        match data {
            Value::Array(items) => {
                objects.extend(items.into_iter().filter(Value::is_object));
            }
            obj @ Value::Object(_) => objects.push(obj),
            _ => {}
        }
    }

    objects
}

/// Parses a JSON-LD block, tolerating a trailing `;` left by some themes.
fn lenient_parse(raw: &str) -> Option<Value> {
    serde_json::from_str(raw)
        .or_else(|_| serde_json::from_str(raw.trim_matches(';')))
        .ok()
}

/// Picks the product object out of the collected blocks: the first object
/// typed `Product` or `ProductGroup` wins; if none is typed that way, the
/// first object at all is taken as best-effort.
pub(crate) fn select_product_object(objects: Vec<Value>) -> Option<Value> {
    if let Some(pos) = objects.iter().position(|obj| {
        matches!(object_type(obj), Some(t) if t == "Product" || t == "ProductGroup")
    }) {
        return objects.into_iter().nth(pos);
    }
    objects.into_iter().next()
}

/// Reads `@type`, accepting both a plain string and the array form JSON-LD
/// permits (first element wins).
pub(crate) fn object_type(obj: &Value) -> Option<&str> {
    match obj.get("@type") {
        Some(Value::String(s)) => Some(s),
        Some(Value::Array(items)) => items.first().and_then(Value::as_str),
        _ => None,
    }
}

/// Commercial fields folded out of one or more offer objects.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct OfferSummary {
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub availability: Option<String>,
    pub original_price: Option<f64>,
    pub original_currency: Option<String>,
}

/// Left-folds repeated offers with a "keep existing if already set"
/// reducer: for every field, the first non-null value across the offer
/// sequence wins. A lone offer object is treated as a one-element sequence.
pub(crate) fn fold_offers(offers: Option<&Value>) -> OfferSummary {
    let mut summary = OfferSummary::default();

    for offer in iter_entries(offers) {
        summary.price = summary
            .price
            .or_else(|| offer.get("price").and_then(coerce_price));
        summary.currency = summary
            .currency
            .or_else(|| string_field(offer, "priceCurrency"));
        summary.availability = summary
            .availability
            .or_else(|| string_field(offer, "availability"));

        if let Some(spec) = offer.get("priceSpecification").filter(|s| s.is_object()) {
            summary.original_price = summary
                .original_price
                .or_else(|| spec.get("price").and_then(coerce_price));
            summary.original_currency = summary
                .original_currency
                .or_else(|| string_field(spec, "priceCurrency"));
        }
    }

    summary
}

/// Maps `hasVariant` entries of a grouped product into variant sub-records,
/// folding each variant's own offers with the same first-non-null rule.
pub(crate) fn group_variants(obj: &Value) -> Vec<PdpVariant> {
    iter_entries(obj.get("hasVariant"))
        .map(|v| {
            let offers = fold_offers(v.get("offers"));
            PdpVariant {
                sku: v.get("sku").and_then(value_as_string),
                name: string_field(v, "name"),
                image: v.get("image").cloned(),
                price: offers.price,
                price_currency: offers.currency,
                availability: offers.availability,
                offers: iter_entries(v.get("offers")).cloned().collect(),
            }
        })
        .collect()
}

/// Flattens `additionalProperty` name/value pairs into a map. Entries
/// without a name are skipped; duplicate names keep the last occurrence.
pub(crate) fn additional_properties(obj: &Value) -> BTreeMap<String, Value> {
    let mut extra = BTreeMap::new();

    for prop in iter_entries(obj.get("additionalProperty")) {
        let Some(name) = prop.get("name").and_then(Value::as_str) else {
            continue;
        };
        if name.is_empty() {
            continue;
        }
        let value = prop.get("value").cloned().unwrap_or(Value::Null);
        extra.insert(name.to_owned(), value);
    }

    extra
}

/// Normalizes the `image` field to a deduplicated URL list. A singular
/// string value becomes a one-element sequence; `ImageObject` entries
/// contribute their `url` field.
pub(crate) fn images_of(obj: &Value) -> Vec<String> {
    let mut urls = Vec::new();
    let mut push = |url: String| {
        if !url.is_empty() && !urls.contains(&url) {
            urls.push(url);
        }
    };

    match obj.get("image") {
        Some(Value::String(s)) => push(s.clone()),
        Some(Value::Array(items)) => {
            for item in items {
                match item {
                    Value::String(s) => push(s.clone()),
                    Value::Object(_) => {
                        if let Some(url) = string_field(item, "url") {
                            push(url);
                        }
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    }

    urls
}

/// Reads a string field, returning `None` for absent or non-string values.
pub(crate) fn string_field(obj: &Value, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_owned)
}

/// Coerces a scalar to its string form: strings pass through, numbers are
/// formatted. Used for identifiers that appear as either on live pages.
pub(crate) fn value_as_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parses a price value that may arrive as a JSON number or a decimal
/// string (optionally with thousands separators).
pub(crate) fn coerce_price(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    }
}

/// Iterates a field that may hold either a single object or a list of
/// objects, yielding only the object entries.
fn iter_entries(value: Option<&Value>) -> Box<dyn Iterator<Item = &Value> + '_> {
    match value {
        Some(obj @ Value::Object(_)) => Box::new(std::iter::once(obj)),
        Some(Value::Array(items)) => Box::new(items.iter().filter(|v| v.is_object())),
        _ => Box::new(std::iter::empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(body: &str) -> Html {
        Html::parse_document(&format!("<html><head>{body}</head><body></body></html>"))
    }

    #[test]
    fn collect_parses_plain_block() {
        let d = doc(r#"<script type="application/ld+json">{"@type":"Product"}</script>"#);
        let objects = collect_objects(&d);
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0]["@type"], json!("Product"));
    }

    #[test]
    fn collect_tolerates_trailing_semicolon() {
        let d = doc(r#"<script type="application/ld+json">{"@type":"Product"};</script>"#);
        assert_eq!(collect_objects(&d).len(), 1);
    }

    #[test]
    fn collect_skips_unparsable_block_without_aborting() {
        let d = doc(concat!(
            r#"<script type="application/ld+json">{{{not json</script>"#,
            r#"<script type="application/ld+json">{"@type":"Product"}</script>"#,
        ));
        assert_eq!(collect_objects(&d).len(), 1);
    }

    #[test]
    fn collect_flattens_array_blocks() {
        let d = doc(
            r#"<script type="application/ld+json">[{"@type":"WebSite"},{"@type":"Product"}]</script>"#,
        );
        assert_eq!(collect_objects(&d).len(), 2);
    }

    #[test]
    fn select_prefers_product_over_earlier_objects() {
        let objects = vec![
            json!({"@type": "BreadcrumbList"}),
            json!({"@type": "Product", "sku": "A-1"}),
        ];
        let picked = select_product_object(objects).unwrap();
        assert_eq!(picked["sku"], json!("A-1"));
    }

    #[test]
    fn select_falls_back_to_first_object() {
        let objects = vec![json!({"@type": "WebSite", "name": "Shop"})];
        let picked = select_product_object(objects).unwrap();
        assert_eq!(picked["name"], json!("Shop"));
    }

    #[test]
    fn select_accepts_array_typed_product() {
        let objects = vec![
            json!({"@type": "WebSite"}),
            json!({"@type": ["ProductGroup", "Thing"], "sku": "G-1"}),
        ];
        let picked = select_product_object(objects).unwrap();
        assert_eq!(picked["sku"], json!("G-1"));
    }

    #[test]
    fn fold_first_non_null_wins() {
        let offers = json!([
            {"priceCurrency": "USD"},
            {"price": "24.00", "priceCurrency": "EUR", "availability": "https://schema.org/InStock"},
            {"price": 99.0}
        ]);
        let summary = fold_offers(Some(&offers));
        assert_eq!(summary.price, Some(24.0));
        assert_eq!(summary.currency.as_deref(), Some("USD"));
        assert_eq!(
            summary.availability.as_deref(),
            Some("https://schema.org/InStock")
        );
    }

    #[test]
    fn fold_accepts_single_offer_object() {
        let offer = json!({"price": 12.5, "priceCurrency": "GBP"});
        let summary = fold_offers(Some(&offer));
        assert_eq!(summary.price, Some(12.5));
        assert_eq!(summary.currency.as_deref(), Some("GBP"));
    }

    #[test]
    fn fold_reads_price_specification() {
        let offer = json!({
            "price": "19.99",
            "priceSpecification": {"price": "29.99", "priceCurrency": "USD"}
        });
        let summary = fold_offers(Some(&offer));
        assert_eq!(summary.original_price, Some(29.99));
        assert_eq!(summary.original_currency.as_deref(), Some("USD"));
    }

    #[test]
    fn additional_properties_skip_nameless_and_keep_last() {
        let obj = json!({
            "additionalProperty": [
                {"value": "orphan"},
                {"name": "Material", "value": "Cotton"},
                {"name": "Material", "value": "Linen"},
                {"name": "Sizes", "value": ["S", "M"]}
            ]
        });
        let props = additional_properties(&obj);
        assert_eq!(props.len(), 2);
        assert_eq!(props["Material"], json!("Linen"));
        assert_eq!(props["Sizes"], json!(["S", "M"]));
    }

    #[test]
    fn additional_properties_accept_single_object() {
        let obj = json!({"additionalProperty": {"name": "Color", "value": "Red"}});
        let props = additional_properties(&obj);
        assert_eq!(props["Color"], json!("Red"));
    }

    #[test]
    fn images_singular_string_becomes_one_element_list() {
        let obj = json!({"image": "https://cdn.example.com/a.jpg"});
        assert_eq!(images_of(&obj), vec!["https://cdn.example.com/a.jpg"]);
    }

    #[test]
    fn images_deduplicate_and_unwrap_image_objects() {
        let obj = json!({"image": [
            "https://cdn.example.com/a.jpg",
            {"@type": "ImageObject", "url": "https://cdn.example.com/b.jpg"},
            "https://cdn.example.com/a.jpg"
        ]});
        assert_eq!(
            images_of(&obj),
            vec![
                "https://cdn.example.com/a.jpg",
                "https://cdn.example.com/b.jpg"
            ]
        );
    }

    #[test]
    fn group_variants_fold_their_own_offers() {
        let obj = json!({
            "@type": "ProductGroup",
            "hasVariant": [
                {
                    "sku": "V-1",
                    "name": "Small",
                    "offers": {"price": "10.00", "priceCurrency": "USD"}
                },
                {
                    "sku": 42,
                    "offers": [
                        {"availability": "https://schema.org/OutOfStock"},
                        {"price": 15.0}
                    ]
                }
            ]
        });
        let variants = group_variants(&obj);
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].sku.as_deref(), Some("V-1"));
        assert_eq!(variants[0].price, Some(10.0));
        assert_eq!(variants[1].sku.as_deref(), Some("42"));
        assert_eq!(variants[1].price, Some(15.0));
        assert_eq!(
            variants[1].availability.as_deref(),
            Some("https://schema.org/OutOfStock")
        );
        assert_eq!(variants[1].offers.len(), 2);
    }

    #[test]
    fn coerce_price_handles_strings_numbers_and_junk() {
        assert_eq!(coerce_price(&json!("24.00")), Some(24.0));
        assert_eq!(coerce_price(&json!(24)), Some(24.0));
        assert_eq!(coerce_price(&json!("1,299.00")), Some(1299.0));
        assert_eq!(coerce_price(&json!("call us")), None);
        assert_eq!(coerce_price(&json!(null)), None);
    }
}
