//! Descriptive reports printed to stdout.
//!
//! Each `render_*` function builds the text so it can be checked without
//! capturing stdout; [`print_section`] writes it.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;

use crate::config::Endpoints;
use crate::pipeline::{CORRECT_ANSWER, CORRECT_OPTION, SELECTED_OPTION, Tables};
use crate::stats::Aggregation;
use crate::table::Table;

const MAX_CELL_WIDTH: usize = 24;

/// Prints a titled block of text.
pub fn print_section(title: &str, body: &str) {
    println!("{title}");
    println!("{body}");
}

fn truncate(s: String) -> String {
    if s.chars().count() <= MAX_CELL_WIDTH {
        return s;
    }
    let mut out: String = s.chars().take(MAX_CELL_WIDTH - 3).collect();
    out.push_str("...");
    out
}

/// Renders a table as a fixed-width grid with a leading row index.
pub fn render_table(table: &Table) -> String {
    let headers: Vec<String> = table.column_names().iter().map(|s| s.to_string()).collect();
    let body: Vec<Vec<String>> = (0..table.row_count())
        .map(|row| {
            table
                .columns()
                .iter()
                .map(|c| truncate(c.cells()[row].to_string()))
                .collect()
        })
        .collect();

    let index_width = table.row_count().saturating_sub(1).to_string().len();
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            body.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let _ = write!(out, "{:index_width$}", "");
    for (h, w) in headers.iter().zip(widths.iter().copied()) {
        let _ = write!(out, "  {h:>w$}");
    }
    for (i, row) in body.iter().enumerate() {
        out.push('\n');
        let _ = write!(out, "{i:<index_width$}");
        for (cell, w) in row.iter().zip(widths.iter().copied()) {
            let _ = write!(out, "  {cell:>w$}");
        }
    }
    out
}

/// Two aligned columns, one line per pair.
fn render_pairs<V: std::fmt::Display>(pairs: &[(&str, V)]) -> String {
    let width = pairs.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    pairs
        .iter()
        .map(|(k, v)| format!("{k:<width$}  {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_schema(table: &Table) -> String {
    render_pairs(&table.schema())
}

pub fn render_missing_counts(table: &Table) -> String {
    render_pairs(&table.missing_counts())
}

/// The option columns next to the derived flag, for the first `rows` rows.
pub fn render_correctness_preview(table: &Table, rows: usize) -> Option<String> {
    if !table.has_column(CORRECT_ANSWER) {
        return None;
    }
    let preview = table
        .select(&["question_id", CORRECT_OPTION, SELECTED_OPTION, CORRECT_ANSWER])
        .head(rows);
    Some(render_table(&preview))
}

pub fn render_aggregation(title: &str, aggregation: &Aggregation) -> String {
    match aggregation {
        Aggregation::Skipped { missing_column } => {
            format!("Error: '{missing_column}' column does not exist")
        }
        Aggregation::Computed(grouped) => {
            let lines: Vec<(String, String)> = grouped
                .groups
                .iter()
                .map(|g| {
                    let mean = g.mean.map_or_else(|| "NaN".to_string(), |m| format!("{m:.6}"));
                    (g.key.to_string(), mean)
                })
                .collect();
            let pairs: Vec<(&str, &str)> = lines.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
            format!("\n{title}:\n{}\n{}", grouped.by, render_pairs(&pairs))
        }
    }
}

/// Previews and missing-value counts for freshly loaded tables.
pub fn print_previews(tables: &Tables, rows: usize) {
    print_section("Current Quiz Data:", &render_table(&tables.current_quiz.head(rows)));
    print_section("\nSubmission Data:", &render_table(&tables.submissions.head(rows)));
    print_section(
        "\nHistorical Quiz Data:",
        &render_table(&tables.historical_quiz.head(rows)),
    );

    print_section(
        "Current Quiz Data Missing Values:",
        &render_missing_counts(&tables.current_quiz),
    );
    print_section(
        "Historical Quiz Data Missing Values:",
        &render_missing_counts(&tables.historical_quiz),
    );
}

pub fn print_schemas(tables: &Tables) {
    print_section("Current Quiz Data Schema:", &render_schema(&tables.current_quiz));
    print_section(
        "\nHistorical Quiz Data Schema:",
        &render_schema(&tables.historical_quiz),
    );
}

#[derive(Debug, Serialize)]
pub struct TableSummary {
    pub name: String,
    pub rows: usize,
    pub columns: usize,
    pub missing_cells: usize,
}

impl TableSummary {
    pub fn from_table(table: &Table) -> Self {
        Self {
            name: table.name().to_string(),
            rows: table.row_count(),
            columns: table.column_count(),
            missing_cells: table.missing_counts().iter().map(|(_, n)| n).sum(),
        }
    }
}

/// Machine-readable outline of a completed run.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub endpoints: Endpoints,
    pub tables: Vec<TableSummary>,
    pub derived_columns: Vec<String>,
    pub charts: Vec<String>,
}

impl RunSummary {
    /// Summarizes the cleaned tables. `derived_columns` lists the columns in
    /// `cleaned` that `loaded` did not have.
    pub fn new(endpoints: &Endpoints, loaded: &Tables, cleaned: &Tables) -> Self {
        let pairs = [
            (&loaded.current_quiz, &cleaned.current_quiz),
            (&loaded.submissions, &cleaned.submissions),
            (&loaded.historical_quiz, &cleaned.historical_quiz),
        ];
        let derived_columns = pairs
            .iter()
            .flat_map(|(before, after)| {
                after
                    .column_names()
                    .into_iter()
                    .filter(|name| !before.has_column(name))
                    .map(|name| format!("{}.{name}", after.name()))
                    .collect::<Vec<_>>()
            })
            .collect();

        Self {
            generated_at: Utc::now(),
            endpoints: endpoints.clone(),
            tables: pairs.iter().map(|(_, t)| TableSummary::from_table(t)).collect(),
            derived_columns,
            charts: Vec::new(),
        }
    }

    pub fn with_charts(mut self, charts: Vec<String>) -> Self {
        self.charts = charts;
        self
    }
}

/// Prints the run summary as pretty JSON.
pub fn print_json(summary: &RunSummary) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}
