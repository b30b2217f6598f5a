//! Product description: the first paragraph of the description subsection,
//! falling back to `og:description`.

use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::dom::{element_text, meta_content, non_empty, selector};

static DESCRIPTION_SUBSECTION: LazyLock<Selector> =
    LazyLock::new(|| selector("div#product_description div.product_subsection"));
static PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| selector("p"));
static OG_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"meta[property="og:description"]"#));

pub(super) fn extract_description(document: &Html) -> Option<String> {
    first_description_paragraph(document).or_else(|| meta_content(document, &OG_DESCRIPTION))
}

fn first_description_paragraph(document: &Html) -> Option<String> {
    document
        .select(&DESCRIPTION_SUBSECTION)
        .next()?
        .select(&PARAGRAPH)
        .next()
        .map(element_text)
        .and_then(non_empty)
}
