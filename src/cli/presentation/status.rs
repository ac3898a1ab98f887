//! Status presentation: stored generation records.

use super::shared::{format_section_heading, to_json, truncate};
use crate::error::ApiError;
use crate::store::{GenerationRecord, GenerationStatus};
use chrono::{DateTime, Utc};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use serde::{Deserialize, Serialize};

const ERROR_COLUMN_WIDTH: usize = 60;

/// One row for status table / JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRow {
    pub keyword: String,
    pub category: String,
    pub status: GenerationStatus,
    pub updated_at: DateTime<Utc>,
    pub last_error: Option<String>,
}

/// Status output for JSON. Counts always cover the whole store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub pending: usize,
    pub records: Vec<StatusRow>,
}

impl StatusReport {
    /// Build a report; `only_unfinished` keeps pending and failed rows only.
    pub fn from_records(records: &[GenerationRecord], only_unfinished: bool) -> Self {
        let count = |status: GenerationStatus| records.iter().filter(|r| r.status == status).count();
        let mut rows: Vec<StatusRow> = records
            .iter()
            .filter(|r| !only_unfinished || !r.is_succeeded())
            .map(|r| StatusRow {
                keyword: r.keyword.clone(),
                category: r.category.clone(),
                status: r.status,
                updated_at: r.updated_at,
                last_error: r.last_error.clone(),
            })
            .collect();
        rows.sort_by(|a, b| a.keyword.cmp(&b.keyword));

        Self {
            total: records.len(),
            succeeded: count(GenerationStatus::Succeeded),
            failed: count(GenerationStatus::Failed),
            pending: count(GenerationStatus::Pending),
            records: rows,
        }
    }
}

pub fn format_status_output(report: &StatusReport, format: &str) -> Result<String, ApiError> {
    if format == "json" {
        return to_json(report);
    }

    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Generation Status")));
    out.push_str(&format!(
        "  Total: {}  Succeeded: {}  Failed: {}  Pending: {}\n\n",
        report.total, report.succeeded, report.failed, report.pending
    ));
    if report.records.is_empty() {
        out.push_str("No records.\n");
        return Ok(out);
    }

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Keyword", "Category", "Status", "Updated", "Error"]);
    for row in &report.records {
        table.add_row(vec![
            row.keyword.clone(),
            row.category.clone(),
            row.status.to_string(),
            row.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            row.last_error
                .as_deref()
                .map(|e| truncate(e, ERROR_COLUMN_WIDTH))
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }
    out.push_str(&format!("{}\n", table));
    Ok(out)
}
