//! Product name and author.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use super::dom::{element_text, meta_content, non_empty, selector};

/// Appended by the site to every `og:title` and `<title>`.
const SITE_TITLE_SUFFIX: &str = "- Penguin Magic Shop";

static PRODUCT_HEADING: LazyLock<Selector> = LazyLock::new(|| selector("div.product-main h1"));
static OG_TITLE: LazyLock<Selector> = LazyLock::new(|| selector(r#"meta[property="og:title"]"#));
static DOCUMENT_TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));

static AUTHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bby\s+([^(]+?)(?:\s*\(|$)").expect("valid regex"));

/// Tried in order; the first non-empty result is the product name.
const NAME_STRATEGIES: &[fn(&Html) -> Option<String>] =
    &[heading_in_product_area, og_title, document_title];

pub(super) fn extract_name(document: &Html) -> Option<String> {
    NAME_STRATEGIES
        .iter()
        .find_map(|strategy| strategy(document))
}

/// `"Invisible Deck by Joe Smith (Red)"` → `"Joe Smith"`.
pub(super) fn extract_author(name: &str) -> Option<String> {
    AUTHOR_RE
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_owned())
        .filter(|author| !author.is_empty())
}

fn heading_in_product_area(document: &Html) -> Option<String> {
    document
        .select(&PRODUCT_HEADING)
        .next()
        .map(element_text)
        .and_then(non_empty)
}

fn og_title(document: &Html) -> Option<String> {
    meta_content(document, &OG_TITLE).and_then(|title| non_empty(strip_site_suffix(&title)))
}

fn document_title(document: &Html) -> Option<String> {
    document
        .select(&DOCUMENT_TITLE)
        .next()
        .map(element_text)
        .and_then(|title| non_empty(strip_site_suffix(&title)))
}

fn strip_site_suffix(title: &str) -> String {
    title.replace(SITE_TITLE_SUFFIX, "").trim().to_owned()
}
