use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Placeholder stored in [`ProductRecord::name`] when no page heading, `og:title`
/// or `<title>` could be found.
pub const NAME_NOT_FOUND: &str = "name not found";

/// A catalog product extracted from its detail page. The page URL is the
/// natural key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    /// Parsed from `"... by <author> (...)"` in the product name.
    pub author: Option<String>,
    /// Pre-discount price. When the page shows a single price, it lands here.
    pub list_price: Option<Decimal>,
    /// Current price, only when it differs from `list_price`.
    pub discounted_price: Option<Decimal>,
    pub url: String,
    pub image_url: Option<String>,
    /// Plain text with whitespace collapsed.
    pub description: Option<String>,
    pub tags: Vec<String>,
    /// Individual reviews in page order, preceded by at most one summary.
    pub reviews: Vec<ReviewEntry>,
    /// Stamped by whoever persists or exports the record, never by extraction.
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProductRecord {
    /// Returns the aggregate rating block, if the page had one.
    #[must_use]
    pub fn summary(&self) -> Option<&ReviewSummary> {
        match self.reviews.first() {
            Some(ReviewEntry::Summary(summary)) => Some(summary),
            _ => None,
        }
    }

    /// Iterates over individual customer reviews, skipping the summary entry.
    pub fn individual_reviews(&self) -> impl Iterator<Item = &Review> {
        self.reviews.iter().filter_map(|entry| match entry {
            ReviewEntry::Review(review) => Some(review),
            ReviewEntry::Summary(_) => None,
        })
    }

    /// Returns `true` when both prices are known and the current one is lower.
    #[must_use]
    pub fn has_discount(&self) -> bool {
        matches!(
            (self.list_price, self.discounted_price),
            (Some(list), Some(discounted)) if discounted < list
        )
    }

    /// Returns `true` when the name is the placeholder rather than page text.
    #[must_use]
    pub fn name_is_placeholder(&self) -> bool {
        self.name == NAME_NOT_FOUND
    }

    /// Returns a copy with `created_at`/`updated_at` set to `now`.
    #[must_use]
    pub fn stamped(mut self, now: DateTime<Utc>) -> Self {
        self.created_at = Some(now);
        self.updated_at = Some(now);
        self
    }
}

/// One entry in [`ProductRecord::reviews`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReviewEntry {
    Summary(ReviewSummary),
    Review(Review),
}

/// A single customer review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Star count 1–5, taken from the `<N>stars.gif` image name.
    pub rating: Option<u8>,
    pub subject: Option<String>,
    pub text: Option<String>,
    /// Kept exactly as displayed, e.g. `"March 3rd, 2021"`.
    pub date: Option<String>,
    pub verified_buyer: bool,
    pub helpful_count: Option<u32>,
    pub helpful_total: Option<u32>,
}

/// Aggregate rating shown above the review list, e.g. `"4.8 stars / 6 reviews"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub overall_rating: f64,
    pub total_reviews: u32,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn make_review(rating: Option<u8>, text: &str) -> Review {
        Review {
            rating,
            subject: Some("Fooled everyone".to_string()),
            text: Some(text.to_string()),
            date: Some("March 3rd, 2021".to_string()),
            verified_buyer: true,
            helpful_count: Some(2),
            helpful_total: Some(3),
        }
    }

    fn make_record(reviews: Vec<ReviewEntry>) -> ProductRecord {
        ProductRecord {
            name: "Invisible Deck by Joe Smith (Blue)".to_string(),
            author: Some("Joe Smith".to_string()),
            list_price: Some(Decimal::from_str("29.95").unwrap()),
            discounted_price: Some(Decimal::from_str("19.95").unwrap()),
            url: "https://www.penguinmagic.com/p/10016".to_string(),
            image_url: None,
            description: Some("A classic.".to_string()),
            tags: vec!["Cards".to_string(), "Close-up".to_string()],
            reviews,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn summary_returns_first_entry_when_it_is_a_summary() {
        let record = make_record(vec![
            ReviewEntry::Summary(ReviewSummary {
                overall_rating: 4.8,
                total_reviews: 6,
            }),
            ReviewEntry::Review(make_review(Some(5), "Great trick")),
        ]);
        let summary = record.summary().expect("expected a summary");
        assert_eq!(summary.total_reviews, 6);
        assert_eq!(record.individual_reviews().count(), 1);
    }

    #[test]
    fn summary_is_none_without_summary_entry() {
        let record = make_record(vec![ReviewEntry::Review(make_review(Some(4), "Nice"))]);
        assert!(record.summary().is_none());
        assert_eq!(record.individual_reviews().count(), 1);
    }

    #[test]
    fn has_discount_requires_lower_current_price() {
        let mut record = make_record(vec![]);
        assert!(record.has_discount());

        record.discounted_price = None;
        assert!(!record.has_discount());

        record.discounted_price = Some(Decimal::from_str("39.95").unwrap());
        assert!(!record.has_discount());
    }

    #[test]
    fn stamped_sets_both_timestamps() {
        let now = Utc::now();
        let record = make_record(vec![]).stamped(now);
        assert_eq!(record.created_at, Some(now));
        assert_eq!(record.updated_at, Some(now));
    }

    #[test]
    fn name_is_placeholder_detects_sentinel() {
        let mut record = make_record(vec![]);
        assert!(!record.name_is_placeholder());
        record.name = NAME_NOT_FOUND.to_string();
        assert!(record.name_is_placeholder());
    }

    #[test]
    fn review_entries_serialize_with_type_tag() {
        let entries = vec![
            ReviewEntry::Summary(ReviewSummary {
                overall_rating: 4.5,
                total_reviews: 2,
            }),
            ReviewEntry::Review(make_review(Some(5), "Great trick")),
        ];
        let json = serde_json::to_value(&entries).expect("serialization failed");
        assert_eq!(json[0]["type"], "summary");
        assert_eq!(json[0]["total_reviews"], 2);
        assert_eq!(json[1]["type"], "review");
        assert_eq!(json[1]["rating"], 5);
        assert_eq!(json[1]["verified_buyer"], true);
    }

    #[test]
    fn serde_roundtrip_record_keeps_prices_exact() {
        let record = make_record(vec![ReviewEntry::Review(make_review(None, "Okay"))]);
        let json = serde_json::to_string(&record).expect("serialization failed");
        assert!(json.contains("\"29.95\""), "prices serialize as strings: {json}");
        let decoded: ProductRecord = serde_json::from_str(&json).expect("deserialization failed");
        assert_eq!(decoded, record);
    }
}
