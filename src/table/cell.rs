use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// A single value in a [`Table`](super::Table) column.
///
/// Equality is exact: `Int(1)` and `Float(1.0)` are different cells.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Missing,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Arrays (and unflattened objects) are kept whole.
    Json(Value),
}

impl Cell {
    /// Converts a scalar JSON value. Objects and arrays become [`Cell::Json`].
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Missing,
            Value::Bool(b) => Cell::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Cell::Int(i),
                None => n.as_f64().map(Cell::Float).unwrap_or(Cell::Missing),
            },
            Value::String(s) => Cell::Text(s.clone()),
            other => Cell::Json(other.clone()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Numeric view of the cell, if it holds a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(i) => Some(*i as f64),
            Cell::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Missing => write!(f, "NaN"),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Int(i) => write!(f, "{i}"),
            Cell::Float(x) => write!(f, "{x}"),
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Json(v) => write!(f, "{v}"),
        }
    }
}

/// Semantic type of a column, fixed when the column is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Boolean,
    Text,
    Json,
    Mixed,
    /// No non-missing value was observed.
    Empty,
}

impl ColumnKind {
    /// Infers the kind from the non-missing cells.
    pub fn sniff<'a>(cells: impl IntoIterator<Item = &'a Cell>) -> Self {
        let mut kind = ColumnKind::Empty;
        for cell in cells {
            let this = match cell {
                Cell::Missing => continue,
                Cell::Bool(_) => ColumnKind::Boolean,
                Cell::Int(_) | Cell::Float(_) => ColumnKind::Numeric,
                Cell::Text(_) => ColumnKind::Text,
                Cell::Json(_) => ColumnKind::Json,
            };
            kind = match kind {
                ColumnKind::Empty => this,
                k if k == this => k,
                _ => return ColumnKind::Mixed,
            };
        }
        kind
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Text => "text",
            ColumnKind::Json => "json",
            ColumnKind::Mixed => "mixed",
            ColumnKind::Empty => "empty",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(Cell::from_json(&json!(null)), Cell::Missing);
        assert_eq!(Cell::from_json(&json!(3)), Cell::Int(3));
        assert_eq!(Cell::from_json(&json!(2.5)), Cell::Float(2.5));
        assert_eq!(Cell::from_json(&json!("B")), Cell::Text("B".into()));
        assert_eq!(Cell::from_json(&json!([1, 2])), Cell::Json(json!([1, 2])));
    }

    #[test]
    fn test_exact_equality() {
        assert_ne!(Cell::Int(1), Cell::Float(1.0));
        assert_ne!(Cell::Text("b".into()), Cell::Text("B".into()));
    }

    #[test]
    fn test_sniff_kinds() {
        let numeric = [Cell::Int(1), Cell::Missing, Cell::Float(2.0)];
        assert_eq!(ColumnKind::sniff(&numeric), ColumnKind::Numeric);

        let mixed = [Cell::Int(1), Cell::Text("x".into())];
        assert_eq!(ColumnKind::sniff(&mixed), ColumnKind::Mixed);

        let empty = [Cell::Missing, Cell::Missing];
        assert_eq!(ColumnKind::sniff(&empty), ColumnKind::Empty);

        assert_eq!(ColumnKind::sniff(&[Cell::Bool(true)]), ColumnKind::Boolean);
    }
}
