//! Product tags.
//!
//! The product's own tags sit in a floated block somewhere after the
//! add-to-cart box. Each tag is a grey chip linking to `/tricks/tagged/…`.
//! The site-wide browse menu links to the same tag pages and must not be
//! mistaken for it.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::dom::{element_text, selector};

static ADD_TO_CART: LazyLock<Selector> = LazyLock::new(|| selector("div.product_addtocart"));
static TAG_CHIP: LazyLock<Selector> = LazyLock::new(|| {
    selector(r#"div[style*="background:#aaa"][style*="border:1px solid #999"]"#)
});
static TAG_LINK: LazyLock<Selector> = LazyLock::new(|| selector(r#"a[href*="/tricks/tagged/"]"#));

const BROWSE_MENU_ID: &str = "browse_menu";

pub(super) fn extract_tags(document: &Html) -> Vec<String> {
    let Some(container) = tag_container(document) else {
        return Vec::new();
    };

    let mut tags: Vec<String> = Vec::new();
    for link in container.select(&TAG_LINK) {
        let tag = element_text(link);
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

/// First `float:left` div after the add-to-cart box that holds at least one
/// tag chip and is not part of the browse menu.
fn tag_container(document: &Html) -> Option<ElementRef<'_>> {
    let anchor_id = document.select(&ADD_TO_CART).next()?.id();

    document
        .root_element()
        .descendants()
        .skip_while(|node| node.id() != anchor_id)
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(|el| is_floated_div(*el))
        .filter(|el| !inside_browse_menu(*el))
        .find(|el| el.select(&TAG_CHIP).next().is_some())
}

fn is_floated_div(element: ElementRef<'_>) -> bool {
    element.value().name() == "div"
        && element
            .value()
            .attr("style")
            .is_some_and(|style| style.contains("float:left"))
}

fn inside_browse_menu(element: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| {
            ancestor.value().name() == "div" && ancestor.value().id() == Some(BROWSE_MENU_ID)
        })
}
