//! Input loading: keyword list and category map.
//!
//! Both files are CSV with a header row. Cells are trimmed; extra columns are
//! ignored.

use crate::error::ApiError;
use crate::types::InputItem;
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Input file locations, relative to the workspace unless absolute
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_keywords_path")]
    pub keywords: PathBuf,

    #[serde(default = "default_categories_path")]
    pub categories: PathBuf,
}

fn default_keywords_path() -> PathBuf {
    PathBuf::from("keywords.csv")
}

fn default_categories_path() -> PathBuf {
    PathBuf::from("categories.csv")
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            keywords: default_keywords_path(),
            categories: default_categories_path(),
        }
    }
}

/// Load `keyword,category` rows from a CSV file.
pub fn load_keywords(path: &Path) -> Result<Vec<InputItem>, ApiError> {
    let file = open(path)?;
    parse_keywords(file, &path.display().to_string())
}

/// Parse `keyword,category` rows. `origin` names the source in errors.
pub fn parse_keywords<R: Read>(reader: R, origin: &str) -> Result<Vec<InputItem>, ApiError> {
    let mut items = Vec::new();
    for (row, record) in records(reader, origin)? {
        let keyword = cell(&record, 0);
        if keyword.is_empty() {
            return Err(input_error(origin, format!("row {}: keyword is empty", row)));
        }
        let category = cell(&record, 1);
        if category.is_empty() {
            warn!(origin, row, keyword, "Keyword has no category");
        }
        items.push(InputItem::new(keyword, category));
    }
    debug!(origin, items = items.len(), "Loaded keywords");
    Ok(items)
}

/// Load `category,query_term` rows from a CSV file.
pub fn load_category_map(path: &Path) -> Result<HashMap<String, String>, ApiError> {
    let file = open(path)?;
    parse_category_map(file, &path.display().to_string())
}

/// Parse `category,query_term` rows. Later rows win on duplicate categories.
pub fn parse_category_map<R: Read>(
    reader: R,
    origin: &str,
) -> Result<HashMap<String, String>, ApiError> {
    let mut map = HashMap::new();
    for (row, record) in records(reader, origin)? {
        let category = cell(&record, 0);
        let term = cell(&record, 1);
        if category.is_empty() || term.is_empty() {
            return Err(input_error(
                origin,
                format!("row {}: category and query term are required", row),
            ));
        }
        if map.insert(category.to_string(), term.to_string()).is_some() {
            warn!(origin, row, category, "Duplicate category, keeping the later term");
        }
    }
    debug!(origin, categories = map.len(), "Loaded category map");
    Ok(map)
}

fn open(path: &Path) -> Result<File, ApiError> {
    File::open(path).map_err(|e| input_error(&path.display().to_string(), e.to_string()))
}

/// Data rows numbered from 2 (the header is row 1). Blank lines are skipped.
fn records<R: Read>(reader: R, origin: &str) -> Result<Vec<(usize, StringRecord)>, ApiError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record =
            result.map_err(|e| input_error(origin, format!("row {}: {}", index + 2, e)))?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        rows.push((index + 2, record));
    }
    Ok(rows)
}

fn cell(record: &StringRecord, index: usize) -> &str {
    record.get(index).unwrap_or("")
}

fn input_error(origin: &str, message: String) -> ApiError {
    ApiError::InputError {
        path: origin.to_string(),
        message,
    }
}
