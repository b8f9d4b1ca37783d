//! Cleaning and derivation steps.
//!
//! Every step takes a [`Table`] by value and hands back the cleaned table.
//! Steps never add or remove rows, and a derived column is only produced when
//! its source columns are present.

use regex::Regex;
use std::sync::LazyLock;
use tracing::{info, warn};

use crate::error::LoadError;
use crate::fetch::RawDatasets;
use crate::stats::mean;
use crate::table::{Cell, Column, ColumnKind, Table};

pub const SELECTED_OPTION: &str = "selected_option";
pub const CORRECT_OPTION: &str = "correct_option";
pub const CORRECT_ANSWER: &str = "correct_answer";
pub const ACCURACY: &str = "accuracy";
pub const ACCURACY_NUMERIC: &str = "accuracy_numeric";
pub const RANK_TEXT: &str = "rank_text";
pub const RANK_NUMERIC: &str = "rank_numeric";

static RANK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+").expect("rank pattern is valid"));

/// The loaded tables, before cleaning.
#[derive(Debug, Clone)]
pub struct Tables {
    pub current_quiz: Table,
    pub submissions: Table,
    pub historical_quiz: Table,
}

impl Tables {
    /// Builds the tables from retrieved documents. Submissions may be nested
    /// and are flattened; the quiz documents are loaded as flat records.
    pub fn load(raw: &RawDatasets) -> Result<Self, LoadError> {
        Ok(Self {
            current_quiz: Table::from_records("current_quiz", &raw.current_quiz)?,
            submissions: Table::from_nested_records("submissions", &raw.submissions)?,
            historical_quiz: Table::from_records("historical_quiz", &raw.historical_quiz)?,
        })
    }
}

/// Replaces the missing cells of every numeric column with that column's
/// mean. Columns of any other kind are returned untouched.
pub fn fill_numeric_missing(mut table: Table) -> Table {
    let table_name = table.name().to_string();
    for column in table.columns_mut() {
        if column.kind() != ColumnKind::Numeric || column.missing_count() == 0 {
            continue;
        }

        let Some(fill) = mean(&column.numeric_values()) else {
            warn!(
                table = %table_name,
                column = column.name(),
                "Numeric column has no values; mean is undefined, leaving it unchanged"
            );
            continue;
        };

        let missing = column.missing_count();
        for cell in column.cells_mut().iter_mut().filter(|c| c.is_missing()) {
            *cell = Cell::Float(fill);
        }
        info!(table = %table_name, column = column.name(), missing, fill, "Filled missing values with column mean");
    }
    table
}

/// Adds `correct_answer` (1 when the selected option equals the correct
/// option, 0 otherwise) if both option columns exist.
pub fn derive_correct_answer(table: Table) -> Table {
    let (Some(selected), Some(correct)) = (table.column(SELECTED_OPTION), table.column(CORRECT_OPTION))
    else {
        warn!(
            table = table.name(),
            "Error: '{SELECTED_OPTION}' or '{CORRECT_OPTION}' column does not exist"
        );
        return table;
    };

    let cells = selected
        .cells()
        .iter()
        .zip(correct.cells())
        .map(|(s, c)| Cell::Int(i64::from(!s.is_missing() && s == c)))
        .collect();

    table.with_column(Column::with_kind(CORRECT_ANSWER, ColumnKind::Numeric, cells))
}

/// Strips `%` and spaces from a text cell and parses the rest. Numbers pass
/// through as floats. Infinite and NaN results count as unparseable.
pub fn parse_accuracy(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Text(s) => s
            .chars()
            .filter(|c| *c != '%' && *c != ' ')
            .collect::<String>()
            .parse()
            .ok()
            .filter(|v: &f64| v.is_finite()),
        other => other.as_f64(),
    }
}

/// Parses the first optionally negative integer embedded in a text cell.
/// A digit run too long to represent as a finite number is unparseable.
pub fn parse_rank(cell: &Cell) -> Option<f64> {
    let m = RANK_PATTERN.find(cell.as_str()?)?;
    m.as_str().parse().ok().filter(|v: &f64| v.is_finite())
}

/// Derives `target` from `source` with `parse`, leaving unparseable cells
/// missing. Returns the table unchanged if `source` is absent.
fn derive_numeric(table: Table, source: &str, target: &str, parse: fn(&Cell) -> Option<f64>) -> Table {
    let Some(column) = table.column(source) else {
        warn!(
            table = table.name(),
            "No '{source}' column available; skipping '{target}'"
        );
        return table;
    };

    let mut failed = 0usize;
    let cells = column
        .cells()
        .iter()
        .map(|cell| match (cell, parse(cell)) {
            (Cell::Missing, _) => Cell::Missing,
            (_, Some(v)) => Cell::Float(v),
            (_, None) => {
                failed += 1;
                Cell::Missing
            }
        })
        .collect();

    if failed > 0 {
        warn!(
            table = table.name(),
            column = source,
            failed,
            "Values could not be converted to numbers; left missing in '{target}'"
        );
    }

    table.with_column(Column::with_kind(target, ColumnKind::Numeric, cells))
}

pub fn derive_accuracy_numeric(table: Table) -> Table {
    derive_numeric(table, ACCURACY, ACCURACY_NUMERIC, parse_accuracy)
}

pub fn derive_rank_numeric(table: Table) -> Table {
    derive_numeric(table, RANK_TEXT, RANK_NUMERIC, parse_rank)
}

pub fn clean_current_quiz(table: Table) -> Table {
    derive_correct_answer(fill_numeric_missing(table))
}

pub fn clean_historical_quiz(table: Table) -> Table {
    derive_rank_numeric(derive_accuracy_numeric(fill_numeric_missing(table)))
}

/// Runs every cleaning step. Submissions are carried through as loaded.
pub fn clean(tables: Tables) -> Tables {
    Tables {
        current_quiz: clean_current_quiz(tables.current_quiz),
        submissions: tables.submissions,
        historical_quiz: clean_historical_quiz(tables.historical_quiz),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn table(columns: Vec<Column>) -> Table {
        Table::from_columns("test", columns).unwrap()
    }

    #[test]
    fn test_fill_uses_column_mean() {
        let t = table(vec![Column::new(
            "points",
            vec![Cell::Int(2), Cell::Int(4), Cell::Missing, Cell::Int(8)],
        )]);

        let filled = fill_numeric_missing(t);
        let cells = filled.column("points").unwrap().cells();
        assert_eq!(cells[2], Cell::Float(14.0 / 3.0));
        assert_eq!(cells[0], Cell::Int(2));
    }

    #[test]
    fn test_fill_is_idempotent() {
        let t = table(vec![
            Column::new("a", vec![Cell::Float(1.5), Cell::Missing, Cell::Int(3)]),
            Column::new("b", vec![Cell::Missing, text("x"), Cell::Missing]),
        ]);

        let once = fill_numeric_missing(t);
        let twice = fill_numeric_missing(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_fill_leaves_non_numeric_columns() {
        let t = table(vec![
            Column::new("label", vec![text("x"), Cell::Missing]),
            Column::new("flag", vec![Cell::Bool(true), Cell::Missing]),
            Column::new("mixed", vec![Cell::Int(1), text("y"), ]),
        ]);

        let filled = fill_numeric_missing(t.clone());
        assert_eq!(filled, t);
    }

    #[test]
    fn test_fill_leaves_all_missing_numeric_column() {
        let t = table(vec![Column::with_kind(
            "points",
            ColumnKind::Numeric,
            vec![Cell::Missing, Cell::Missing],
        )]);

        let filled = fill_numeric_missing(t.clone());
        assert_eq!(filled, t);
    }

    #[test]
    fn test_correct_answer_flag() {
        let t = table(vec![
            Column::new("question_id", vec![Cell::Int(1), Cell::Int(2), Cell::Int(3)]),
            Column::new(CORRECT_OPTION, vec![text("B"), text("C"), text("a")]),
            Column::new(SELECTED_OPTION, vec![text("B"), text("B"), text("A")]),
        ]);

        let t = derive_correct_answer(t);
        let flags = t.column(CORRECT_ANSWER).unwrap();
        assert_eq!(flags.kind(), ColumnKind::Numeric);
        assert_eq!(flags.cells(), &[Cell::Int(1), Cell::Int(0), Cell::Int(0)]);
    }

    #[test]
    fn test_correct_answer_requires_same_type() {
        let t = table(vec![
            Column::new(CORRECT_OPTION, vec![Cell::Int(2), Cell::Missing]),
            Column::new(SELECTED_OPTION, vec![text("2"), Cell::Missing]),
        ]);

        let t = derive_correct_answer(t);
        assert_eq!(
            t.column(CORRECT_ANSWER).unwrap().cells(),
            &[Cell::Int(0), Cell::Int(0)]
        );
    }

    #[test]
    fn test_correct_answer_skipped_without_both_columns() {
        let t = table(vec![Column::new(SELECTED_OPTION, vec![text("B")])]);

        let t = derive_correct_answer(t);
        assert!(!t.has_column(CORRECT_ANSWER));
        assert_eq!(t.column_count(), 1);
    }

    #[test]
    fn test_parse_accuracy() {
        assert_eq!(parse_accuracy(&text("87 %")), Some(87.0));
        assert_eq!(parse_accuracy(&text(" 12.5%")), Some(12.5));
        assert_eq!(parse_accuracy(&Cell::Int(90)), Some(90.0));
        assert_eq!(parse_accuracy(&text("N/A")), None);
        assert_eq!(parse_accuracy(&Cell::Bool(true)), None);
    }

    #[test]
    fn test_parse_rank() {
        assert_eq!(parse_rank(&text("-12th Rank")), Some(-12.0));
        assert_eq!(parse_rank(&text("Rank 3 of 40")), Some(3.0));
        assert_eq!(parse_rank(&text("Unranked")), None);
        assert_eq!(parse_rank(&Cell::Int(4)), None);
    }

    #[test]
    fn test_non_finite_values_are_unparseable() {
        assert_eq!(parse_accuracy(&text("inf %")), None);
        assert_eq!(parse_accuracy(&text("-infinity")), None);
        assert_eq!(parse_accuracy(&text("NaN")), None);
        let long_rank = format!("Rank {}", "9".repeat(400));
        assert_eq!(parse_rank(&text(&long_rank)), None);
    }

    #[test]
    fn test_nan_accuracy_becomes_missing() {
        let t = table(vec![Column::new(
            ACCURACY,
            vec![text("NaN"), text("50 %"), text("inf %"), text("70%")],
        )]);

        let derived = derive_accuracy_numeric(t);
        let column = derived.column(ACCURACY_NUMERIC).unwrap();
        assert_eq!(
            column.cells(),
            &[Cell::Missing, Cell::Float(50.0), Cell::Missing, Cell::Float(70.0)]
        );
        assert_eq!(column.missing_count(), 2);
        assert_eq!(column.numeric_values(), vec![50.0, 70.0]);
    }

    #[test]
    fn test_derived_columns_keep_row_count() {
        let t = table(vec![
            Column::new(ACCURACY, vec![text("87 %"), text("N/A"), Cell::Missing]),
            Column::new(RANK_TEXT, vec![text("-12th Rank"), text("Unranked"), text("#7")]),
        ]);

        let t = clean_historical_quiz(t);
        assert_eq!(t.row_count(), 3);
        assert_eq!(
            t.column(ACCURACY_NUMERIC).unwrap().cells(),
            &[Cell::Float(87.0), Cell::Missing, Cell::Missing]
        );
        assert_eq!(
            t.column(RANK_NUMERIC).unwrap().cells(),
            &[Cell::Float(-12.0), Cell::Missing, Cell::Float(7.0)]
        );
    }

    #[test]
    fn test_derivations_skip_absent_sources() {
        let t = table(vec![Column::new("score", vec![Cell::Int(1)])]);

        let t = clean_historical_quiz(t);
        assert_eq!(t.column_names(), vec!["score"]);
    }
}
