//! JSON-lines export of scraped products.
//!
//! One [`ProductRecord`] per line. A URL already present in the file, or seen
//! earlier in the same batch, is not written again, so repeated runs over an
//! overlapping id range only add new products.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use pmdb_core::ProductRecord;

#[derive(Debug, Clone)]
pub(crate) struct JsonlExporter {
    path: PathBuf,
}

impl JsonlExporter {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Appends the records whose URL is not in the file yet.
    ///
    /// Returns the number of lines written.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or written, or a record
    /// fails to serialize.
    pub(crate) fn append_rows(&self, records: &[ProductRecord]) -> anyhow::Result<usize> {
        let mut seen = self.existing_urls()?;

        let fresh: Vec<&ProductRecord> = records
            .iter()
            .filter(|record| seen.insert(record.url.clone()))
            .collect();
        if fresh.is_empty() {
            return Ok(0);
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;
        let mut writer = BufWriter::new(file);
        for record in &fresh {
            serde_json::to_writer(&mut writer, record)
                .with_context(|| format!("failed to serialize {}", record.url))?;
            writer.write_all(b"\n")?;
        }
        writer
            .flush()
            .with_context(|| format!("failed to write {}", self.path.display()))?;

        Ok(fresh.len())
    }

    /// URLs of the rows already in the file. A missing file has none; lines
    /// that are not JSON objects with a `url` string are ignored.
    fn existing_urls(&self) -> anyhow::Result<HashSet<String>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashSet::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", self.path.display()))
            }
        };

        Ok(contents
            .lines()
            .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
            .filter_map(|row| row.get("url")?.as_str().map(str::to_owned))
            .collect())
    }
}
