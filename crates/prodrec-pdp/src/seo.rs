//! Page-level SEO field extraction.
//!
//! These fields are read straight from the document head and top-of-body
//! markup, independent of any structured product data.

use std::sync::LazyLock;

use prodrec_core::{Seo, TitleFormat};
use scraper::{Html, Selector};

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));
static H1_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1").expect("valid selector"));
static META_DESCRIPTION_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[name="description"]"#).expect("valid selector"));
static OG_DESCRIPTION_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[property="og:description"]"#).expect("valid selector")
});
static CANONICAL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"link[rel="canonical"]"#).expect("valid selector"));
static ROBOTS_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[name="robots"]"#).expect("valid selector"));
static HTML_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("html").expect("valid selector"));

pub(crate) fn extract_seo(doc: &Html) -> Seo {
    let title_tag = first_text(doc, &TITLE_SELECTOR);
    let meta_description = attr_content(doc, &META_DESCRIPTION_SELECTOR, "content")
        .or_else(|| attr_content(doc, &OG_DESCRIPTION_SELECTOR, "content"));
    let canonical = attr_content(doc, &CANONICAL_SELECTOR, "href");
    let robots = attr_content(doc, &ROBOTS_SELECTOR, "content");
    let page_lang = attr_content(doc, &HTML_SELECTOR, "lang");
    let h1 = first_text(doc, &H1_SELECTOR);
    let (title_format, title_format_notes) = detect_title_format(title_tag.as_deref());

    Seo {
        title_tag,
        meta_description,
        h1,
        canonical,
        robots,
        page_lang,
        title_format,
        title_format_notes,
    }
}

/// Classifies the `<title>` separator convention. `" | "` beats `" - "`
/// when both appear; a missing title yields `None` with no notes.
pub(crate) fn detect_title_format(title_tag: Option<&str>) -> (TitleFormat, Option<String>) {
    let Some(title) = title_tag else {
        return (TitleFormat::None, None);
    };

    if title.contains(" | ") {
        return (
            TitleFormat::Pipe,
            Some("Title tag contains ' | ' separator (often '{page} | {brand}').".to_owned()),
        );
    }
    if title.contains(" - ") {
        return (
            TitleFormat::Dash,
            Some(
                "Title tag contains ' - ' separator (often '{brand} - {page}' or \
                 '{page} - {brand}')."
                    .to_owned(),
            ),
        );
    }
    (
        TitleFormat::None,
        Some("No common separator detected.".to_owned()),
    )
}

/// Flattened, whitespace-normalized text of the first element matching
/// `selector`, or `None` when nothing matches or the text is empty.
pub(crate) fn first_text(doc: &Html, selector: &Selector) -> Option<String> {
    let element = doc.select(selector).next()?;
    let text = flatten_text(element);
    (!text.is_empty()).then_some(text)
}

/// Joins an element's text nodes with single spaces, trimming each piece.
pub(crate) fn flatten_text(element: scraper::ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn attr_content(doc: &Html, selector: &Selector, attr: &str) -> Option<String> {
    let value = doc.select(selector).next()?.value().attr(attr)?.trim();
    (!value.is_empty()).then(|| value.to_owned())
}
