//! Report generation.
//!
//! The JSON output is the figure list itself, ready for a plotting front
//! end. The Markdown output summarizes the same figures for reading.

use crate::analysis::axis_summary;
use crate::models::{Figure, Report, ReportMetadata, Trace};
use anyhow::Result;

/// Serialize the figures as a JSON array.
pub fn generate_json_report(figures: &[Figure], pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(figures)?
    } else {
        serde_json::to_string(figures)?
    };
    Ok(json)
}

/// Generate a complete Markdown report.
///
/// Bar charts list at most `max_rows` categories.
pub fn generate_markdown_report(report: &Report, max_rows: usize) -> String {
    let mut output = String::new();

    output.push_str("# Chocolate Ratings Dashboard\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_table_of_contents(&report.figures));

    for figure in &report.figures {
        output.push_str(&generate_figure_section(figure, max_rows));
    }

    output.push_str(&generate_footer());

    output
}

fn anchor(title: &str) -> String {
    title.replace(' ', "-").to_lowercase()
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Data File:** `{}`\n", metadata.data_path));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Rows Loaded:** {}\n", metadata.rows_loaded));
    section.push_str(&format!(
        "- **Top-Rated Threshold:** {}\n",
        metadata.top_rated_threshold
    ));
    section.push_str(&format!(
        "- **Scatter Threshold:** {}\n",
        metadata.scatter_threshold
    ));
    section.push_str(&format!(
        "- **Duration:** {:.3}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

fn generate_table_of_contents(figures: &[Figure]) -> String {
    let mut toc = String::new();

    toc.push_str("## Charts\n\n");
    for figure in figures {
        toc.push_str(&format!(
            "- [{}](#{})\n",
            figure.layout.title,
            anchor(&figure.layout.title)
        ));
    }
    toc.push('\n');

    toc
}

/// Generate the section for one figure.
fn generate_figure_section(figure: &Figure, max_rows: usize) -> String {
    let mut section = String::new();

    section.push_str(&format!("## {}\n\n", figure.layout.title));

    if figure.is_empty() {
        section.push_str("*No rows passed the cleaning rules for this chart.*\n\n");
        return section;
    }

    for trace in &figure.data {
        match trace {
            Trace::Bar { x, y } => {
                let label = figure
                    .layout
                    .yaxis
                    .as_ref()
                    .map(|axis| axis.title.as_str())
                    .unwrap_or("Count");
                section.push_str(&generate_bar_table(x, y, label, max_rows));
            }
            Trace::Scatter { x, y, .. } => {
                section.push_str(&generate_scatter_summary(figure, x, y));
            }
        }
    }

    section
}

fn generate_bar_table(x: &[String], y: &[usize], label: &str, max_rows: usize) -> String {
    let mut table = String::new();

    table.push_str(&format!("| Category | {} |\n", label));
    table.push_str("|:---|---:|\n");

    for (category, count) in x.iter().zip(y).take(max_rows) {
        table.push_str(&format!("| {} | {} |\n", category, count));
    }

    if x.len() > max_rows {
        let rest: usize = y.iter().skip(max_rows).sum();
        table.push_str(&format!(
            "| *{} more* | {} |\n",
            x.len() - max_rows,
            rest
        ));
    }
    table.push('\n');

    table
}

fn generate_scatter_summary(figure: &Figure, x: &[f64], y: &[f64]) -> String {
    let mut summary = String::new();

    let x_label = figure
        .layout
        .xaxis
        .as_ref()
        .map(|axis| axis.title.as_str())
        .unwrap_or("x");
    let y_label = figure
        .layout
        .yaxis
        .as_ref()
        .map(|axis| axis.title.as_str())
        .unwrap_or("y");

    summary.push_str(&format!("*Points: {}*\n\n", x.len()));
    summary.push_str("| Axis | Min | Max | Mean |\n");
    summary.push_str("|:---|---:|---:|---:|\n");

    for (label, values) in [(x_label, x), (y_label, y)] {
        if let Some(stats) = axis_summary(values) {
            summary.push_str(&format!(
                "| {} | {:.2} | {:.2} | {:.2} |\n",
                label, stats.min, stats.max, stats.mean
            ));
        }
    }
    summary.push('\n');

    summary
}

fn generate_footer() -> String {
    "---\n\n*Report generated by CacaoDash*\n".to_string()
}
