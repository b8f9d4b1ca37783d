//! In-memory rectangular tables with named, typed columns.
//!
//! A [`Table`] is built once from a JSON document (see [`loader`]) and its row
//! count never changes afterwards. Cleaning steps replace or append whole
//! columns.

mod cell;
pub mod loader;

pub use cell::{Cell, ColumnKind};

use crate::error::LoadError;

/// A named column whose [`ColumnKind`] is fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    kind: ColumnKind,
    cells: Vec<Cell>,
}

impl Column {
    /// Builds a column and sniffs its kind from the cells.
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        let kind = ColumnKind::sniff(&cells);
        Self::with_kind(name, kind, cells)
    }

    /// Builds a column with a declared kind.
    pub fn with_kind(name: impl Into<String>, kind: ColumnKind, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            kind,
            cells,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_missing()).count()
    }

    /// Every numeric value in the column, skipping anything else.
    pub fn numeric_values(&self) -> Vec<f64> {
        self.cells.iter().filter_map(Cell::as_f64).collect()
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    rows: usize,
    columns: Vec<Column>,
}

impl Table {
    /// Assembles a table from pre-built columns, which must all be the same
    /// length.
    pub fn from_columns(name: impl Into<String>, columns: Vec<Column>) -> Result<Self, LoadError> {
        let name = name.into();
        let rows = columns.first().map(Column::len).unwrap_or(0);
        if rows == 0 {
            return Err(LoadError::Empty { table: name });
        }
        if let Some(bad) = columns.iter().find(|c| c.len() != rows) {
            return Err(LoadError::RaggedColumn {
                table: name,
                column: bad.name.clone(),
                expected: rows,
                found: bad.len(),
            });
        }
        Ok(Self {
            name,
            rows,
            columns,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Column name to kind, in column order.
    pub fn schema(&self) -> Vec<(&str, ColumnKind)> {
        self.columns.iter().map(|c| (c.name.as_str(), c.kind)).collect()
    }

    pub fn missing_counts(&self) -> Vec<(&str, usize)> {
        self.columns
            .iter()
            .map(|c| (c.name.as_str(), c.missing_count()))
            .collect()
    }

    /// Row-major grid of `true` where a cell is missing.
    pub fn missing_mask(&self) -> Vec<Vec<bool>> {
        (0..self.rows)
            .map(|row| {
                self.columns
                    .iter()
                    .map(|c| c.cells[row].is_missing())
                    .collect()
            })
            .collect()
    }

    /// The first `n` rows as a new table.
    pub fn head(&self, n: usize) -> Table {
        let rows = n.min(self.rows);
        Table {
            name: self.name.clone(),
            rows,
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    kind: c.kind,
                    cells: c.cells[..rows].to_vec(),
                })
                .collect(),
        }
    }

    /// A table with only the named columns that exist, in the given order.
    pub fn select(&self, names: &[&str]) -> Table {
        Table {
            name: self.name.clone(),
            rows: self.rows,
            columns: names
                .iter()
                .filter_map(|n| self.column(n).cloned())
                .collect(),
        }
    }

    /// Appends `column`, or replaces an existing column of the same name.
    /// Callers build `column` from this table's rows, so lengths always match.
    pub(crate) fn with_column(mut self, column: Column) -> Table {
        assert_eq!(
            column.len(),
            self.rows,
            "column '{}' does not match the table's row count",
            column.name
        );
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
        self
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_columns(
            "sample",
            vec![
                Column::new("id", vec![Cell::Int(1), Cell::Int(2), Cell::Int(3)]),
                Column::new(
                    "label",
                    vec![Cell::Text("a".into()), Cell::Missing, Cell::Text("c".into())],
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_from_columns_rejects_ragged() {
        let err = Table::from_columns(
            "t",
            vec![
                Column::new("a", vec![Cell::Int(1), Cell::Int(2)]),
                Column::new("b", vec![Cell::Int(1)]),
            ],
        )
        .unwrap_err();

        assert!(matches!(err, LoadError::RaggedColumn { expected: 2, found: 1, .. }));
    }

    #[test]
    fn test_missing_counts_and_mask() {
        let t = sample();
        assert_eq!(t.missing_counts(), vec![("id", 0), ("label", 1)]);
        assert_eq!(t.missing_mask()[1], vec![false, true]);
    }

    #[test]
    fn test_head_truncates_rows() {
        let t = sample();
        assert_eq!(t.head(2).row_count(), 2);
        assert_eq!(t.head(10).row_count(), 3);
    }

    #[test]
    fn test_select_skips_absent_columns() {
        let t = sample();
        assert_eq!(t.select(&["label", "nope", "id"]).column_names(), vec!["label", "id"]);
    }

    #[test]
    fn test_with_column_replaces_in_place() {
        let t = sample().with_column(Column::new(
            "id",
            vec![Cell::Int(7), Cell::Int(8), Cell::Int(9)],
        ));
        assert_eq!(t.column_names(), vec!["id", "label"]);
        assert_eq!(t.column("id").unwrap().cells()[0], Cell::Int(7));
    }

    #[test]
    #[should_panic(expected = "does not match the table's row count")]
    fn test_with_column_rejects_wrong_length() {
        let _ = sample().with_column(Column::new("extra", vec![Cell::Int(1)]));
    }
}
