//! Batch presentation: generate/regenerate summaries and export reports.

use super::shared::{format_section_heading, to_json, truncate};
use crate::artifacts::ArtifactReport;
use crate::error::ApiError;
use crate::generator::BatchSummary;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use serde_json::json;

const ERROR_COLUMN_WIDTH: usize = 80;

pub fn format_batch_output(
    summary: &BatchSummary,
    export: Option<&ArtifactReport>,
    format: &str,
) -> Result<String, ApiError> {
    if format == "json" {
        return to_json(&json!({ "summary": summary, "export": export }));
    }

    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Generation")));
    out.push_str(&format!("  Succeeded: {}\n", summary.succeeded));
    out.push_str(&format!("  Failed: {}\n", summary.failed));
    out.push_str(&format!("  Skipped (already generated): {}\n", summary.skipped));

    if !summary.failures.is_empty() {
        out.push('\n');
        out.push_str(&format!("{}\n\n", format_section_heading("Failures")));
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Keyword", "Error"]);
        for failure in &summary.failures {
            table.add_row(vec![
                failure.keyword.clone(),
                truncate(&failure.error, ERROR_COLUMN_WIDTH),
            ]);
        }
        out.push_str(&format!("{}\n", table));
        out.push_str("\nRun `quill regenerate` to retry failed keywords.\n");
    }

    if let Some(report) = export {
        out.push('\n');
        out.push_str(&format_export_text(report));
    }
    Ok(out)
}

pub fn format_export_output(report: &ArtifactReport, format: &str) -> Result<String, ApiError> {
    if format == "json" {
        return to_json(report);
    }
    Ok(format_export_text(report))
}

fn format_export_text(report: &ArtifactReport) -> String {
    format!(
        "{}\n\n  Aggregate: {} ({} rows)\n  Per-keyword files: {}\n",
        format_section_heading("Export"),
        report.aggregate_path.display(),
        report.rows,
        report.item_files.len()
    )
}
