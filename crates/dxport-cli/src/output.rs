//! Rendering job summaries for the terminal

use comfy_table::{ContentArrangement, Table};
use dxport_interchange::{JobKind, JobStatus, JobSummary};

/// How the summary is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatKind {
    Table,
    Json,
}

pub fn format_summary(summary: &JobSummary, format: OutputFormatKind) -> anyhow::Result<String> {
    match format {
        OutputFormatKind::Json => Ok(serde_json::to_string_pretty(summary)?),
        OutputFormatKind::Table => Ok(format_table(summary)),
    }
}

fn format_table(summary: &JobSummary) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec!["Job".to_string(), format!("{} {}", summary.kind, summary.table)]);
    table.add_row(vec!["Status".to_string(), status_label(&summary.status)]);
    table.add_row(vec!["Rows read".to_string(), summary.rows_read.to_string()]);
    table.add_row(vec!["Rows written".to_string(), summary.rows_written.to_string()]);

    if summary.kind == JobKind::Import {
        table.add_row(vec!["Batches".to_string(), summary.batches_written.to_string()]);
        table.add_row(vec![
            "Rows with defaults".to_string(),
            summary.rows_defaulted.to_string(),
        ]);
        table.add_row(vec![
            "Unresolvable rows".to_string(),
            summary.rows_unresolvable.to_string(),
        ]);
        table.add_row(vec!["Warnings".to_string(), summary.warnings.to_string()]);
    }
    table.add_row(vec![
        "Elapsed".to_string(),
        format!("{:.2}s", summary.elapsed.as_secs_f64()),
    ]);

    let mut out = table.to_string();
    if !summary.messages.is_empty() {
        out.push_str("\n\nMessages:");
        for message in &summary.messages {
            out.push_str("\n  - ");
            out.push_str(message);
        }
        if summary.suppressed_messages > 0 {
            out.push_str(&format!(
                "\n  ... and {} more",
                summary.suppressed_messages
            ));
        }
    }
    out
}

fn status_label(status: &JobStatus) -> String {
    match status {
        JobStatus::Failed(_) => "failed".to_string(),
        other => other.to_string(),
    }
}
