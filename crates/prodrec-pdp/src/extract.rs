//! The extraction pipeline: structured data first, HTML heuristics second.
//!
//! Stages run in a fixed order and each stage only fills fields the prior
//! stages left empty, so structured markup is never overwritten by a
//! heuristic. The whole pipeline is pure and infallible: a field that
//! cannot be extracted is absent, not an error.

use std::sync::LazyLock;

use prodrec_core::{
    Commercial, Descriptive, Identity, Media, ProductRecord, Taxonomy,
};
use regex::Regex;
use scraper::{Html, Selector};

use crate::jsonld;
use crate::seo;

/// Description containers probed in order; the first selector that matches
/// wins. Appending a selector here is how a new storefront theme gets
/// supported.
const DESCRIPTION_SELECTORS: &[&str] = &[
    ".product.attribute.description",
    ".product-info-main .value",
    ".product-description",
];

/// Image fallback strategies, most specific first. Scanning stops at the
/// first group that yields any source at all, so the `img[src]` catch-all
/// only runs on pages with no recognizable gallery markup.
const IMAGE_SELECTOR_GROUPS: &[&str] = &[
    ".product.media img",
    ".gallery-placeholder img",
    ".fotorama__stage__frame img",
    "img[src]",
];

const PRICE_SELECTOR: &str = ".price, .special-price .price, .product-info-main .price";
const OLD_PRICE_SELECTOR: &str = ".old-price .price, .price-box .old-price .price";
const FINAL_PRICE_SELECTOR: &str = r#"[data-price-type="finalPrice"] [data-price-amount]"#;
const BREADCRUMB_SELECTOR: &str = "nav a, .breadcrumb a";

static SYMBOL_PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([$£€])\s*([\d.,]+)").expect("valid regex"));
static PRODUCT_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(SKU|Product Code)\s*:\s*([A-Z0-9\-]+)").expect("valid regex"));

/// Extracts a [`ProductRecord`] from already-fetched page HTML.
///
/// Deterministic: byte-identical HTML yields an identical record.
#[must_use]
pub fn extract_from_html(url: &str, html: &str) -> ProductRecord {
    let doc = Html::parse_document(html);

    let seo = seo::extract_seo(&doc);
    let (description_html, description_plain) = description_block(&doc);

    // Structured-data stage.
    let product_ld = jsonld::select_product_object(jsonld::collect_objects(&doc));

    let mut identity = Identity {
        url: url.to_owned(),
        canonical_url: Some(url.to_owned()),
        sku: None,
        product_code: None,
        normalized_sku: None,
    };
    let mut descriptive = Descriptive {
        title: None,
        description: None,
        description_html,
        description_plain,
    };
    let mut commercial = Commercial {
        price: None,
        price_currency: None,
        original_price: None,
        original_price_currency: None,
        availability: None,
    };
    let mut images = Vec::new();
    let mut variants = Vec::new();
    let mut extended_attributes = std::collections::BTreeMap::new();
    let mut product_type = None;

    if let Some(obj) = &product_ld {
        product_type = jsonld::object_type(obj).map(str::to_owned);

        identity.sku = obj.get("sku").and_then(jsonld::value_as_string);
        if let Some(id) = jsonld::string_field(obj, "@id") {
            identity.canonical_url = Some(id);
        }

        descriptive.title = jsonld::string_field(obj, "name");
        descriptive.description = jsonld::string_field(obj, "description");

        let offers = jsonld::fold_offers(obj.get("offers"));
        commercial.price = offers.price;
        commercial.price_currency = offers.currency;
        commercial.availability = offers.availability;
        commercial.original_price = offers.original_price;
        commercial.original_price_currency = offers.original_currency;

        images = jsonld::images_of(obj);
        if product_type.as_deref() == Some("ProductGroup") {
            variants = jsonld::group_variants(obj);
        }
        extended_attributes = jsonld::additional_properties(obj);
    }

    // Heuristic stage: fill only what structured data left empty.
    let breadcrumbs = breadcrumbs(&doc);
    identity.product_code = scan_product_code(&doc).or_else(|| identity.sku.clone());

    if descriptive.title.is_none() {
        descriptive.title = seo.h1.clone();
    }
    if descriptive.description.is_none() {
        descriptive.description = descriptive.description_plain.clone();
    }
    if images.is_empty() {
        images = fallback_images(&doc);
    }
    if commercial.price.is_none() {
        let (price, currency) = fallback_price(&doc);
        commercial.price = price;
        if commercial.price_currency.is_none() {
            commercial.price_currency = currency;
        }
    }
    if commercial.original_price.is_none() {
        let (price, currency) = fallback_old_price(&doc);
        commercial.original_price = price;
        if commercial.original_price_currency.is_none() {
            commercial.original_price_currency = currency;
        }
    }

    identity.normalized_sku = identity.sku.clone().or_else(|| identity.product_code.clone());

    ProductRecord {
        identity,
        descriptive,
        commercial,
        media: Media { images },
        taxonomy: Taxonomy { breadcrumbs },
        extended_attributes,
        variants,
        seo,
        product_type,
        raw_structured_data: product_ld,
    }
}

/// Probes the description container list and returns `(html, plain_text)`
/// of the first match.
fn description_block(doc: &Html) -> (Option<String>, Option<String>) {
    for raw_selector in DESCRIPTION_SELECTORS {
        let Ok(selector) = Selector::parse(raw_selector) else {
            continue;
        };
        if let Some(element) = doc.select(&selector).next() {
            let html = element.html();
            let plain = seo::flatten_text(element);
            return (
                (!html.is_empty()).then_some(html),
                (!plain.is_empty()).then_some(plain),
            );
        }
    }
    (None, None)
}

/// Image fallback: first selector group with any hit wins. The lazy-load
/// attribute is checked before the standard source attribute because
/// gallery themes leave a placeholder in `src`.
fn fallback_images(doc: &Html) -> Vec<String> {
    for raw_selector in IMAGE_SELECTOR_GROUPS {
        let Ok(selector) = Selector::parse(raw_selector) else {
            continue;
        };
        let mut urls: Vec<String> = Vec::new();
        for img in doc.select(&selector) {
            let Some(src) = img
                .value()
                .attr("data-src")
                .or_else(|| img.value().attr("src"))
            else {
                continue;
            };
            let src = src.trim();
            if src.is_empty() || urls.iter().any(|u| u == src) {
                continue;
            }
            urls.push(src.to_owned());
        }
        if !urls.is_empty() {
            return urls;
        }
    }
    Vec::new()
}

/// Price fallback: a finalized price amount attribute beats parsing the
/// visible price text. The attribute path carries no currency.
fn fallback_price(doc: &Html) -> (Option<f64>, Option<String>) {
    if let Ok(selector) = Selector::parse(FINAL_PRICE_SELECTOR) {
        if let Some(price) = doc
            .select(&selector)
            .next()
            .and_then(|el| el.value().attr("data-price-amount"))
            .and_then(|raw| raw.trim().parse::<f64>().ok())
        {
            return (Some(price), None);
        }
    }
    parse_price_element(doc, PRICE_SELECTOR)
}

fn fallback_old_price(doc: &Html) -> (Option<f64>, Option<String>) {
    parse_price_element(doc, OLD_PRICE_SELECTOR)
}

/// Parses `"$24.00"`-style text out of the first element matching
/// `raw_selector`. The currency symbol maps deterministically to an ISO
/// code; unknown symbols yield a price with no currency.
fn parse_price_element(doc: &Html, raw_selector: &str) -> (Option<f64>, Option<String>) {
    let Ok(selector) = Selector::parse(raw_selector) else {
        return (None, None);
    };
    let Some(element) = doc.select(&selector).next() else {
        return (None, None);
    };
    let text = seo::flatten_text(element);
    let Some(captures) = SYMBOL_PRICE_RE.captures(&text) else {
        return (None, None);
    };

    let currency = match &captures[1] {
        "$" => Some("USD".to_owned()),
        "€" => Some("EUR".to_owned()),
        "£" => Some("GBP".to_owned()),
        _ => None,
    };
    let price = captures[2].replace(',', "").parse::<f64>().ok();
    (price, currency)
}

/// Scans every text node for a `"SKU: ..."` / `"Product Code: ..."` label;
/// the first match in document order wins.
fn scan_product_code(doc: &Html) -> Option<String> {
    doc.root_element()
        .text()
        .find_map(|node| PRODUCT_CODE_RE.captures(node))
        .map(|captures| captures[2].to_owned())
}

/// Collects breadcrumb anchor texts, deduplicated, in page order.
fn breadcrumbs(doc: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse(BREADCRUMB_SELECTOR) else {
        return Vec::new();
    };
    let mut crumbs: Vec<String> = Vec::new();
    for anchor in doc.select(&selector) {
        let text = seo::flatten_text(anchor);
        if text.is_empty() || crumbs.iter().any(|c| c == &text) {
            continue;
        }
        crumbs.push(text);
    }
    crumbs
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
