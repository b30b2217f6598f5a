//! List and discounted price.
//!
//! The price details table and JSON-LD offers can each yield both prices.
//! Everything after them only looks for a single list price, and a product
//! with no price anywhere ends up at zero with `defaulted` set.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

use super::dom::{element_text, meta_content, parse_amount, selector};

static PRICE_TABLE: LazyLock<Selector> =
    LazyLock::new(|| selector("table.product_price_details"));
static TABLE_ROW: LazyLock<Selector> = LazyLock::new(|| selector("tr"));
static TABLE_CELL: LazyLock<Selector> = LazyLock::new(|| selector("td"));
static STRUCK_THROUGH: LazyLock<Selector> = LazyLock::new(|| selector("strike"));
static JSON_LD: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"script[type="application/ld+json"]"#));
static META_PRICE: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"meta[property="product:price:amount"]"#));

/// Elements that sometimes hold the price on older page layouts, in the order
/// they are tried. Only the first match of each selector is considered.
static PRICE_ELEMENTS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        "span.price",
        "div.product-price",
        "span.regular-price",
        "div.price-box",
        r#"span[itemprop="price"]"#,
    ]
    .into_iter()
    .map(selector)
    .collect()
});

static DOLLAR_AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(\d+\.?\d*)").expect("valid regex"));

/// Single-price fallbacks for the list price, tried in order once the
/// structured sources are exhausted.
const LIST_PRICE_FALLBACKS: &[fn(&Html) -> Option<Decimal>] =
    &[meta_price_amount, price_element_text, largest_dollar_amount];

/// Outcome of price extraction for one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Prices {
    pub list_price: Option<Decimal>,
    pub discounted_price: Option<Decimal>,
    /// `true` when no strategy found anything and `list_price` is the zero default.
    pub defaulted: bool,
}

/// Prices collected from the structured sources before normalization.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct PriceCandidates {
    list: Option<Decimal>,
    discounted: Option<Decimal>,
}

pub(super) fn extract_prices(document: &Html) -> Prices {
    let mut candidates = PriceCandidates::default();
    read_price_table(document, &mut candidates);
    read_json_ld_offers(document, &mut candidates);
    normalize(&mut candidates);

    let list = candidates.list.or_else(|| {
        LIST_PRICE_FALLBACKS
            .iter()
            .find_map(|fallback| fallback(document))
    });

    match list {
        Some(list_price) => Prices {
            list_price: Some(list_price),
            discounted_price: candidates.discounted,
            defaulted: false,
        },
        None => Prices {
            list_price: Some(Decimal::ZERO),
            discounted_price: None,
            defaulted: true,
        },
    }
}

/// Reads `table.product_price_details`:
///
/// ```text
/// <tr><td>List price:</td><td><strike>$29.95</strike></td></tr>
/// <tr><td>Price:</td><td class="ourprice">$19.95</td></tr>
/// ```
fn read_price_table(document: &Html, candidates: &mut PriceCandidates) {
    let Some(table) = document.select(&PRICE_TABLE).next() else {
        return;
    };

    for row in table.select(&TABLE_ROW) {
        let cells: Vec<ElementRef<'_>> = row.select(&TABLE_CELL).collect();
        let [label_cell, value_cell, ..] = cells.as_slice() else {
            continue;
        };
        let label = element_text(*label_cell).to_lowercase();

        if label.contains("list price") {
            if candidates.list.is_some() {
                continue;
            }
            candidates.list = match value_cell.select(&STRUCK_THROUGH).next() {
                Some(strike) => parse_amount(&element_text(strike)),
                None => parse_amount(&element_text(*value_cell)),
            };
        } else if label.contains("price:")
            && has_class(*value_cell, "ourprice")
            && candidates.discounted.is_none()
        {
            candidates.discounted = parse_amount(&element_text(*value_cell));
        }
    }
}

/// Reads `offers.price` (current price) and `offers.priceSpecification.price`
/// (list price) from the first JSON-LD object that carries an `offers` object.
fn read_json_ld_offers(document: &Html, candidates: &mut PriceCandidates) {
    if candidates.list.is_some() && candidates.discounted.is_some() {
        return;
    }

    for script in document.select(&JSON_LD) {
        let raw: String = script.text().collect();
        let Ok(value) = serde_json::from_str::<Value>(raw.trim()) else {
            continue;
        };
        let Some(offers) = value.get("offers").filter(|o| o.is_object()) else {
            continue;
        };

        if candidates.discounted.is_none() {
            candidates.discounted = offers.get("price").and_then(json_amount);
        }
        if candidates.list.is_none() {
            candidates.list = offers
                .get("priceSpecification")
                .and_then(|spec| spec.get("price"))
                .and_then(json_amount);
        }
        break;
    }
}

/// A single known price is the list price, never a discount; a "discount"
/// equal to the list price is no discount either.
fn normalize(candidates: &mut PriceCandidates) {
    if candidates.list.is_none() {
        candidates.list = candidates.discounted.take();
    }
    if candidates.discounted.is_some() && candidates.discounted == candidates.list {
        candidates.discounted = None;
    }
}

fn meta_price_amount(document: &Html) -> Option<Decimal> {
    meta_content(document, &META_PRICE).and_then(|content| parse_amount(&content))
}

fn price_element_text(document: &Html) -> Option<Decimal> {
    PRICE_ELEMENTS.iter().find_map(|price_selector| {
        document
            .select(price_selector)
            .next()
            .and_then(|el| parse_amount(&element_text(el)))
    })
}

/// Largest `$N.NN` anywhere in the page text. Promotional copy like
/// "$5 off" tends to be smaller than the real price.
fn largest_dollar_amount(document: &Html) -> Option<Decimal> {
    let text = document.root_element().text().collect::<Vec<_>>().join(" ");
    DOLLAR_AMOUNT_RE
        .captures_iter(&text)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| parse_amount(m.as_str()))
        .max()
}

/// A positive JSON-LD price, given either as a number (`35`, `9.5`, `1e3`)
/// or as a display string.
fn json_amount(value: &Value) -> Option<Decimal> {
    let amount = match value {
        Value::Number(n) => {
            let raw = n.to_string();
            Decimal::from_str(&raw)
                .or_else(|_| Decimal::from_scientific(&raw))
                .ok()?
        }
        Value::String(s) if s.trim_start().starts_with('-') => return None,
        Value::String(s) => parse_amount(s)?,
        _ => return None,
    };
    Some(amount).filter(|a| *a > Decimal::ZERO)
}

fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}
