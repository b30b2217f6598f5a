//! `parse`: run extraction on a saved product page.

use std::path::Path;

use anyhow::Context;
use pmdb_scraper::extract_product_from_html;

/// Extracts the product in the HTML file at `path` and prints it as pretty
/// JSON. Data quality warnings are logged, not printed.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the page has no product
/// content.
pub(crate) fn run_parse(path: &Path, url: &str) -> anyhow::Result<()> {
    let html = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let extraction = extract_product_from_html(&html, url)
        .with_context(|| format!("failed to extract product from {}", path.display()))?;

    for warning in &extraction.warnings {
        tracing::warn!(file = %path.display(), %warning, "data quality warning");
    }

    println!("{}", serde_json::to_string_pretty(&extraction.record)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.html");

        let err = run_parse(&path, "https://www.penguinmagic.com/p/1").unwrap_err();
        assert!(err.to_string().contains("absent.html"));
    }

    #[test]
    fn page_without_product_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.html");
        std::fs::write(&path, "<html><body></body></html>").unwrap();

        let err = run_parse(&path, "https://www.penguinmagic.com/p/1").unwrap_err();
        assert!(err.to_string().contains("failed to extract product"));
    }

    #[test]
    fn saved_page_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("10016.html");
        std::fs::write(
            &path,
            r#"<html><head><title>Coin Bite - Penguin Magic Shop</title></head>
            <body><span class="price">$15.00</span></body></html>"#,
        )
        .unwrap();

        assert!(run_parse(&path, "https://www.penguinmagic.com/p/10016").is_ok());
    }
}
