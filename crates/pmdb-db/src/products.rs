//! Database operations for `products`.

use chrono::{DateTime, Utc};
use pmdb_core::{ProductRecord, ReviewEntry};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::PgPool;
use url::Url;

use crate::DbError;

/// Default page size for [`search_products`].
pub const DEFAULT_SEARCH_LIMIT: i64 = 50;

const PRODUCT_COLUMNS: &str = "id, url, name, author, list_price, discounted_price, image_url, \
     description, tags, reviews, created_at, updated_at";

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub url: String,
    pub name: String,
    pub author: Option<String>,
    pub list_price: Option<Decimal>,
    pub discounted_price: Option<Decimal>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    /// Stored as a JSONB array of tagged entries.
    pub reviews: Json<Vec<ReviewEntry>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductRow {
    /// Converts the row back into the record shape produced by extraction.
    #[must_use]
    pub fn into_record(self) -> ProductRecord {
        ProductRecord {
            name: self.name,
            author: self.author,
            list_price: self.list_price,
            discounted_price: self.discounted_price,
            url: self.url,
            image_url: self.image_url,
            description: self.description,
            tags: self.tags,
            reviews: self.reviews.0,
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        }
    }
}

/// Filters for [`search_products`]. Text filters are case-insensitive
/// substring matches; `tag` must equal one of the product's tags exactly.
#[derive(Debug, Clone)]
pub struct ProductSearch<'a> {
    pub name: Option<&'a str>,
    pub author: Option<&'a str>,
    pub tag: Option<&'a str>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for ProductSearch<'_> {
    fn default() -> Self {
        Self {
            name: None,
            author: None,
            tag: None,
            min_price: None,
            max_price: None,
            limit: DEFAULT_SEARCH_LIMIT,
            offset: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Largest amount a `NUMERIC(10,2)` price column holds, 99999999.99.
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// Checks a record before it is written.
///
/// # Errors
///
/// Returns [`DbError::InvalidRecord`] if the name is blank, the URL is not an
/// absolute http(s) URL with a host, or either price is negative or above
/// [`MAX_PRICE`].
pub fn validate_record(record: &ProductRecord) -> Result<(), DbError> {
    if record.name.trim().is_empty() {
        return Err(DbError::InvalidRecord("name is empty".to_string()));
    }

    let has_web_host = Url::parse(&record.url).is_ok_and(|url| {
        matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty())
    });
    if !has_web_host {
        return Err(DbError::InvalidRecord(format!(
            "url is not an absolute http(s) URL: {:?}",
            record.url
        )));
    }

    for (field, value) in [
        ("list_price", record.list_price),
        ("discounted_price", record.discounted_price),
    ] {
        let Some(value) = value else { continue };
        if value.is_sign_negative() && !value.is_zero() {
            return Err(DbError::InvalidRecord(format!("{field} is negative")));
        }
        if value > MAX_PRICE {
            return Err(DbError::InvalidRecord(format!(
                "{field} {value} exceeds {MAX_PRICE}"
            )));
        }
    }

    Ok(())
}

/// Builds an `ILIKE` pattern matching `needle` anywhere, with `%`, `_` and
/// `\` in the input matched literally.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

// ---------------------------------------------------------------------------
// products operations
// ---------------------------------------------------------------------------

/// Inserts or updates a product keyed by URL.
///
/// On conflict every extracted field is replaced and `updated_at` advances;
/// `created_at` keeps its original value. Missing timestamps on the record
/// default to `NOW()`.
///
/// Returns the internal `id` of the upserted row.
///
/// # Errors
///
/// Returns [`DbError::InvalidRecord`] if [`validate_record`] rejects the
/// record, or [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_product(pool: &PgPool, record: &ProductRecord) -> Result<i64, DbError> {
    validate_record(record)?;

    let id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO products \
             (url, name, author, list_price, discounted_price, image_url, description, \
              tags, reviews, created_at, updated_at) \
         VALUES ($1, $2, $3, $4::numeric(10,2), $5::numeric(10,2), $6, $7, \
                 $8, $9::jsonb, COALESCE($10, NOW()), COALESCE($11, NOW())) \
         ON CONFLICT (url) DO UPDATE SET \
             name             = EXCLUDED.name, \
             author           = EXCLUDED.author, \
             list_price       = EXCLUDED.list_price, \
             discounted_price = EXCLUDED.discounted_price, \
             image_url        = EXCLUDED.image_url, \
             description      = EXCLUDED.description, \
             tags             = EXCLUDED.tags, \
             reviews          = EXCLUDED.reviews, \
             updated_at       = EXCLUDED.updated_at \
         RETURNING id",
    )
    .bind(&record.url)
    .bind(&record.name)
    .bind(&record.author)
    .bind(record.list_price)
    .bind(record.discounted_price)
    .bind(&record.image_url)
    .bind(&record.description)
    .bind(&record.tags)
    .bind(Json(&record.reviews))
    .bind(record.created_at)
    .bind(record.updated_at)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Returns the product stored for `url`, if any.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_product_by_url(pool: &PgPool, url: &str) -> Result<Option<ProductRow>, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE url = $1"
    ))
    .bind(url)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns products matching every set filter, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn search_products(
    pool: &PgPool,
    search: &ProductSearch<'_>,
) -> Result<Vec<ProductRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} \
         FROM products \
         WHERE ($1::TEXT IS NULL OR name ILIKE $1) \
           AND ($2::TEXT IS NULL OR author ILIKE $2) \
           AND ($3::TEXT IS NULL OR $3 = ANY(tags)) \
           AND ($4::NUMERIC IS NULL OR list_price >= $4) \
           AND ($5::NUMERIC IS NULL OR list_price <= $5) \
         ORDER BY created_at DESC, id DESC \
         LIMIT $6 OFFSET $7"
    ))
    .bind(search.name.map(contains_pattern))
    .bind(search.author.map(contains_pattern))
    .bind(search.tag)
    .bind(search.min_price)
    .bind(search.max_price)
    .bind(search.limit.max(0))
    .bind(search.offset.max(0))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns the number of stored products.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_products(pool: &PgPool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
