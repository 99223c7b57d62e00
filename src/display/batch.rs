//! Batch summary formatting
//!
//! Renders a [`BatchReport`] as an aligned table with one row per database.

use crate::batch::{BatchReport, BatchStatus, ItemOutcome};

use super::report::{column_width, format_bytes, separator};

/// Format the per-database results of a run
///
/// `action` is the past-tense verb for completed items, e.g. "backed up".
pub fn format_batch_summary(report: &BatchReport, action: &str) -> String {
    if report.items.is_empty() {
        return "No databases processed.".to_string();
    }

    let name_width = column_width(report.items.iter().map(|i| i.base_name.as_str()), 8);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:<7}  {:>10}  {}\n",
        "Database",
        "Result",
        "Size",
        "Detail",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:-<7}  {:->10}  {:-<6}\n",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for item in &report.items {
        let (result, size, detail) = match &item.outcome {
            ItemOutcome::Completed { bytes, output } => (
                "ok",
                format_bytes(*bytes),
                output
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            ),
            ItemOutcome::Skipped { reached, error } => (
                "skipped",
                String::new(),
                format!("{} (after: {})", error, reached),
            ),
        };

        output.push_str(&format!(
            "{:<name_width$}  {:<7}  {:>10}  {}\n",
            item.base_name,
            result,
            size,
            detail,
            name_width = name_width,
        ));
    }

    let width = name_width + 2 + 7 + 2 + 10 + 2 + 6;
    output.push_str(&separator(width));
    output.push('\n');

    let status = match report.status() {
        BatchStatus::Success => "complete",
        BatchStatus::Partial => "partial",
        BatchStatus::NothingSucceeded => "failed",
    };
    output.push_str(&format!(
        "{} of {} database(s) {} ({}, {} skipped)\n",
        report.succeeded(),
        report.items.len(),
        action,
        status,
        report.skipped()
    ));

    if let Some(path) = &report.output {
        output.push_str(&format!("Output: {}\n", path.display()));
    }

    output
}
