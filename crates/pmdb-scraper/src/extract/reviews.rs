//! Customer reviews and the overall rating summary.
//!
//! Review markup, per block:
//!
//! ```text
//! <div class="product_review">
//!   <div class="review_header">
//!     <img src="/images/5stars.gif"> <span class="review_subject">Wow</span>
//!     <div class="review_from">Reviewed by Jo on May 3rd, 2021
//!       <span class="review_verified">Verified buyer</span></div>
//!   </div>
//!   <div class="review_body">Great trick</div>
//!   4 of 5 magicians found this helpful.
//! </div>
//! ```

use std::sync::LazyLock;

use pmdb_core::{Review, ReviewEntry, ReviewSummary};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::dom::{element_text, non_empty, selector};

static REVIEWS_CONTAINER: LazyLock<Selector> = LazyLock::new(|| selector("div#sorted-reviews"));
static REVIEW_BLOCK: LazyLock<Selector> = LazyLock::new(|| selector("div.product_review"));
static REVIEW_HEADER: LazyLock<Selector> = LazyLock::new(|| selector("div.review_header"));
static REVIEW_BODY: LazyLock<Selector> = LazyLock::new(|| selector("div.review_body"));
static STAR_IMAGE: LazyLock<Selector> = LazyLock::new(|| selector(r#"img[src*="stars."]"#));
static REVIEW_SUBJECT: LazyLock<Selector> = LazyLock::new(|| selector("span.review_subject"));
static REVIEW_FROM: LazyLock<Selector> = LazyLock::new(|| selector("div.review_from"));
static REVIEW_VERIFIED: LazyLock<Selector> = LazyLock::new(|| selector("span.review_verified"));
static SUMMARY_LINK: LazyLock<Selector> =
    LazyLock::new(|| selector(r##"div#review_summary a[href="#reviews"]"##));

static STAR_RATING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)stars\.[A-Za-z0-9]+").expect("valid regex"));
static REVIEW_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bon\s+([A-Za-z]+\s+\d+[a-z]{0,2},\s+\d{4})").expect("valid regex")
});
static HELPFUL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s+of\s+(\d+)\s+(?:\S+\s+)?found\s+this\s+helpful").expect("valid regex")
});
static SUMMARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([\d.]+)\s+stars?\s*/\s*(\d+)\s+reviews?").expect("valid regex")
});

const VERIFIED_MARKER: &str = "Verified buyer";

/// Individual reviews in document order, prefixed by the summary entry when
/// the page shows one. A page without the review list has no reviews at all,
/// even if a summary link is present.
pub(super) fn extract_reviews(document: &Html) -> Vec<ReviewEntry> {
    let Some(container) = document.select(&REVIEWS_CONTAINER).next() else {
        return Vec::new();
    };

    let mut entries: Vec<ReviewEntry> = review_blocks(container)
        .filter_map(parse_review)
        .map(ReviewEntry::Review)
        .collect();

    if let Some(summary) = extract_summary(document) {
        entries.insert(0, ReviewEntry::Summary(summary));
    }
    entries
}

/// `div.product_review` elements that hold an actual review. The site reuses
/// the class on the header row, so those are skipped.
fn review_blocks<'a>(container: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    container.select(&REVIEW_BLOCK).filter(|block| {
        !block.value().classes().any(|c| c == "review_header")
            && (block.select(&REVIEW_HEADER).next().is_some()
                || block.select(&REVIEW_BODY).next().is_some())
    })
}

fn parse_review(block: ElementRef<'_>) -> Option<Review> {
    let header = block.select(&REVIEW_HEADER).next();

    let rating = header.and_then(star_rating);
    let text = block
        .select(&REVIEW_BODY)
        .next()
        .map(element_text)
        .and_then(non_empty);
    if rating.is_none() && text.is_none() {
        return None;
    }

    let subject = header
        .and_then(|h| h.select(&REVIEW_SUBJECT).next())
        .map(element_text)
        .and_then(non_empty);
    let from = header.and_then(|h| h.select(&REVIEW_FROM).next());
    let date = from.and_then(|f| {
        REVIEW_DATE_RE
            .captures(&element_text(f))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_owned())
    });
    let verified_buyer = from.is_some_and(|f| {
        f.select(&REVIEW_VERIFIED)
            .any(|span| element_text(span).contains(VERIFIED_MARKER))
    });
    let (helpful_count, helpful_total) = helpful_votes(block).unzip();

    Some(Review {
        rating,
        subject,
        text,
        date,
        verified_buyer,
        helpful_count,
        helpful_total,
    })
}

/// Rating encoded in the star image file name, e.g. `4stars.gif` → 4.
fn star_rating(header: ElementRef<'_>) -> Option<u8> {
    header.select(&STAR_IMAGE).find_map(|img| {
        let src = img.value().attr("src")?;
        let caps = STAR_RATING_RE.captures(src)?;
        caps[1].parse::<u8>().ok().filter(|r| (1..=5).contains(r))
    })
}

fn helpful_votes(block: ElementRef<'_>) -> Option<(u32, u32)> {
    let text = element_text(block);
    let caps = HELPFUL_RE.captures(&text)?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

/// `"4.8 stars / 6 reviews"` in the summary link above the review list.
fn extract_summary(document: &Html) -> Option<ReviewSummary> {
    let link = document.select(&SUMMARY_LINK).next()?;
    let text = element_text(link);
    let caps = SUMMARY_RE.captures(&text)?;
    Some(ReviewSummary {
        overall_rating: caps[1].parse().ok()?,
        total_reviews: caps[2].parse().ok()?,
    })
}
