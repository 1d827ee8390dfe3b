//! Post metadata extraction.
//!
//! Every post starts with a delimited header block of `key: value` lines
//! (delimiters come from `header_tokens`, default `<!--`/`-->`):
//!
//! ```markdown
//! <!--
//! layout: post
//! title: Hello World
//! -->
//! # Hello World
//! ```
//!
//! Extraction splits each line on the first colon and trims both sides.
//! Later keys with the same name overwrite earlier ones. A missing or
//! malformed header is reported as a warning and yields an empty mapping;
//! it never aborts the build.

use crate::{config::SiteConfig, log};
use serde::Serialize;
use std::{collections::BTreeMap, path::{Path, PathBuf}};

/// Keys derived from the source path. Header values under these names are
/// always overwritten.
const DERIVED_KEYS: &[&str] = &["file", "filename", "link"];

/// Metadata for a single post, created per source file at the start of a
/// build and discarded when the build completes.
#[derive(Debug, Clone, Serialize)]
pub struct PostMeta {
    /// Source file path.
    pub file: PathBuf,

    /// Output file stem. `hello-world.md` → `"hello-world"`.
    pub filename: String,

    /// Public URL path. `"/hello-world.html"`.
    pub link: String,

    /// Front-matter key/value pairs.
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

impl PostMeta {
    /// Extract metadata from the raw contents of one source file.
    pub fn extract(source: &Path, raw: &str, config: &SiteConfig) -> Self {
        let fields = match header_block(raw, config.header_open(), config.header_close()) {
            Some(block) => parse_fields(block, source),
            None => {
                log!("warn"; "{}: no front-matter header found", source.display());
                BTreeMap::new()
            }
        };

        let filename = source
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let link = format!("/{filename}.html");

        Self {
            file: source.to_path_buf(),
            filename,
            link,
            fields,
        }
    }

    /// Look up a front-matter field.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}

/// Slice the header block out of `raw`, without the delimiters.
///
/// The block must open at the start of the file (leading whitespace aside).
fn header_block<'a>(raw: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let trimmed = raw.trim_start();
    let body = trimmed.strip_prefix(open)?;
    let end = body.find(close)?;
    Some(&body[..end])
}

/// Parse `key: value` lines into a mapping. Last write wins.
fn parse_fields(block: &str, source: &Path) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();

    for line in block.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.split_once(':') {
            Some((key, value)) => {
                let key = key.trim();
                if key.is_empty() || DERIVED_KEYS.contains(&key) {
                    continue;
                }
                fields.insert(key.to_owned(), value.trim().to_owned());
            }
            None => {
                log!("warn"; "{}: skipping header line without colon: `{line}`", source.display());
            }
        }
    }

    fields
}
