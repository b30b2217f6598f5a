//! Small document-query helpers shared by the field extractors.

use std::str::FromStr;

use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};

/// Compiles a selector literal. Only called with constant CSS from this crate.
pub(super) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

/// Collapses every whitespace run (including line breaks) to one space and
/// trims the ends.
pub(super) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Visible text of `element`: text nodes joined by spaces, whitespace collapsed.
///
/// Joining with a space keeps `foo<br>bar` from reading as `foobar`.
pub(super) fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

pub(super) fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Trimmed `content` attribute of the first element matching `meta`.
pub(super) fn meta_content(document: &Html, meta: &Selector) -> Option<String> {
    document
        .select(meta)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Parses a displayed amount such as `"$19.95"` or `"USD 1,299.00"`.
///
/// Every character other than ASCII digits and `.` is dropped first. Empty,
/// malformed and zero amounts are all treated as "no price here".
pub(super) fn parse_amount(text: &str) -> Option<Decimal> {
    let digits: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if digits.is_empty() {
        return None;
    }
    Decimal::from_str(&digits).ok().filter(|v| !v.is_zero())
}
