//! Artifact writer
//!
//! Renders the succeeded records of the store into CSV files:
//!
//! - `<dir>/generated.csv`: one row per succeeded record, ordered by keyword
//! - `<dir>/keywords/<slug>_generated.csv`: the same row alone, one file per record
//!
//! Export is a pure function of the store contents, so running it twice yields
//! the same files. Failed and pending records are never exported.

use crate::error::ApiError;
use crate::store::GenerationRecord;
use csv::Writer;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

pub const AGGREGATE_FILE_NAME: &str = "generated.csv";
pub const PER_ITEM_DIR_NAME: &str = "keywords";
const PER_ITEM_SUFFIX: &str = "_generated.csv";
const MAX_SLUG_LEN: usize = 80;

pub const CSV_HEADERS: [&str; 10] = [
    "keyword",
    "title",
    "category",
    "metatitle",
    "metadesc",
    "raw_content",
    "cleaned_content",
    "html_content",
    "img_url",
    "img_attribution",
];

/// Output section of the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Artifact directory, relative to the workspace unless absolute
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("generated")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

/// What an export run wrote
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactReport {
    pub aggregate_path: PathBuf,
    pub rows: usize,
    pub item_files: Vec<PathBuf>,
}

pub struct ArtifactWriter {
    output_dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write the aggregate and per-item files for every succeeded record.
    pub fn write_all(&self, records: &[GenerationRecord]) -> Result<ArtifactReport, ApiError> {
        let mut succeeded: Vec<&GenerationRecord> =
            records.iter().filter(|r| r.is_succeeded()).collect();
        succeeded.sort_by(|a, b| a.keyword.cmp(&b.keyword));

        let item_dir = self.output_dir.join(PER_ITEM_DIR_NAME);
        fs::create_dir_all(&item_dir).map_err(|e| artifact_error(&item_dir, e))?;
        self.remove_stale_item_files(&item_dir)?;

        let aggregate_path = self.output_dir.join(AGGREGATE_FILE_NAME);
        let mut aggregate = open_writer(&aggregate_path)?;

        let mut used = HashSet::new();
        let mut item_files = Vec::with_capacity(succeeded.len());
        for record in &succeeded {
            let row = record_row(record);
            aggregate.write_record(row)?;

            let slug = unique_slug(&record.title, &mut used);
            let item_path = item_dir.join(format!("{}{}", slug, PER_ITEM_SUFFIX));
            let mut item = open_writer(&item_path)?;
            item.write_record(row)?;
            item.flush().map_err(|e| artifact_error(&item_path, e))?;
            debug!(keyword = %record.keyword, path = %item_path.display(), "Wrote item artifact");
            item_files.push(item_path);
        }
        aggregate
            .flush()
            .map_err(|e| artifact_error(&aggregate_path, e))?;

        info!(
            path = %aggregate_path.display(),
            rows = succeeded.len(),
            skipped = records.len() - succeeded.len(),
            "Exported artifacts"
        );
        Ok(ArtifactReport {
            aggregate_path,
            rows: succeeded.len(),
            item_files,
        })
    }

    fn remove_stale_item_files(&self, item_dir: &Path) -> Result<(), ApiError> {
        for entry in fs::read_dir(item_dir).map_err(|e| artifact_error(item_dir, e))? {
            let path = entry.map_err(|e| artifact_error(item_dir, e))?.path();
            let is_item_file = path
                .file_name()
                .and_then(|name| name.to_str())
                .map_or(false, |name| name.ends_with(PER_ITEM_SUFFIX));
            if is_item_file && path.is_file() {
                fs::remove_file(&path).map_err(|e| artifact_error(&path, e))?;
            }
        }
        Ok(())
    }
}

fn record_row(record: &GenerationRecord) -> [&str; 10] {
    [
        record.keyword.as_str(),
        record.title.as_str(),
        record.category.as_str(),
        record.meta_title.as_str(),
        record.meta_desc.as_str(),
        record.raw_content.as_str(),
        record.cleaned_content.as_str(),
        record.rendered_content.as_str(),
        record.image_url.as_str(),
        record.image_attribution.as_str(),
    ]
}

fn open_writer(path: &Path) -> Result<Writer<fs::File>, ApiError> {
    let mut writer = Writer::from_path(path).map_err(|e| artifact_error(path, e))?;
    writer.write_record(CSV_HEADERS)?;
    Ok(writer)
}

fn artifact_error(path: &Path, err: impl std::fmt::Display) -> ApiError {
    ApiError::ArtifactError {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

/// Filesystem-safe slug: accents folded, lowercase ASCII alphanumerics
/// separated by single underscores. Never empty.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_separator = false;
    for c in title.nfkd().filter(|c| !is_combining_mark(*c)) {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            slug.push(c.to_ascii_lowercase());
            if slug.len() >= MAX_SLUG_LEN {
                break;
            }
        } else {
            pending_separator = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("untitled");
    }
    slug
}

/// [`slugify`] plus a numeric suffix for slugs already in `used`.
fn unique_slug(title: &str, used: &mut HashSet<String>) -> String {
    let base = slugify(title);
    let mut candidate = base.clone();
    let mut n = 2;
    while !used.insert(candidate.clone()) {
        candidate = format!("{}_{}", base, n);
        n += 1;
    }
    candidate
}
