pub mod catalog;
pub mod client;
pub mod error;
pub mod extract;
mod rate_limit;

pub use catalog::product_page_url;
pub use client::PageClient;
pub use error::{ExtractionError, ScraperError};
pub use extract::{extract_product, extract_product_from_html, Extraction, ExtractionWarning};
