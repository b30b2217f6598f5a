//! Product detail page extraction.
//!
//! [`extract_product`] runs five independent field procedures over a parsed
//! page and assembles a [`ProductRecord`]. A procedure that finds nothing
//! yields `None` or an empty list; only a page with no product content at all
//! fails outright. Extraction does no I/O and does not log: data quality
//! problems come back as [`ExtractionWarning`]s for the caller to report.

mod description;
mod dom;
mod name;
mod price;
mod reviews;
mod tags;

use std::fmt;
use std::sync::LazyLock;

use pmdb_core::{ProductRecord, NAME_NOT_FOUND};
use scraper::{Html, Selector};

use crate::error::ExtractionError;

use self::dom::{meta_content, selector};

static OG_IMAGE: LazyLock<Selector> = LazyLock::new(|| selector(r#"meta[property="og:image"]"#));

/// A record plus the data quality issues found while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub record: ProductRecord,
    pub warnings: Vec<ExtractionWarning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionWarning {
    /// No heading, `og:title` or `<title>`; the name is [`NAME_NOT_FOUND`].
    NameNotFound,
    /// No price anywhere on the page; `list_price` is zero.
    PriceDefaulted,
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NameNotFound => write!(f, "product name not found, stored placeholder"),
            Self::PriceDefaulted => write!(f, "no price found, list price defaulted to 0"),
        }
    }
}

/// Extracts a product record from a parsed detail page.
///
/// The returned record never has timestamps set; stamp it with
/// [`ProductRecord::stamped`] before persisting.
///
/// # Errors
///
/// Returns [`ExtractionError::MissingUrl`] if `url` is blank, and
/// [`ExtractionError::NoProductSignal`] if the page has no name and nothing
/// else that belongs to a product either.
pub fn extract_product(document: &Html, url: &str) -> Result<Extraction, ExtractionError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ExtractionError::MissingUrl);
    }

    let name = name::extract_name(document);
    let prices = price::extract_prices(document);
    let description = description::extract_description(document);
    let tags = tags::extract_tags(document);
    let reviews = reviews::extract_reviews(document);
    let image_url = meta_content(document, &OG_IMAGE);

    let mut warnings = Vec::new();

    let name = match name {
        Some(name) => name,
        None => {
            let has_other_signal = !prices.defaulted
                || description.is_some()
                || !tags.is_empty()
                || !reviews.is_empty()
                || image_url.is_some();
            if !has_other_signal {
                return Err(ExtractionError::NoProductSignal {
                    url: url.to_owned(),
                });
            }
            warnings.push(ExtractionWarning::NameNotFound);
            NAME_NOT_FOUND.to_owned()
        }
    };

    if prices.defaulted {
        warnings.push(ExtractionWarning::PriceDefaulted);
    }

    let author = if name == NAME_NOT_FOUND {
        None
    } else {
        name::extract_author(&name)
    };

    Ok(Extraction {
        record: ProductRecord {
            name,
            author,
            list_price: prices.list_price,
            discounted_price: prices.discounted_price,
            url: url.to_owned(),
            image_url,
            description,
            tags,
            reviews,
            created_at: None,
            updated_at: None,
        },
        warnings,
    })
}

/// Parses `html` and runs [`extract_product`] on it.
///
/// # Errors
///
/// Same as [`extract_product`].
pub fn extract_product_from_html(html: &str, url: &str) -> Result<Extraction, ExtractionError> {
    let document = Html::parse_document(html);
    extract_product(&document, url)
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
