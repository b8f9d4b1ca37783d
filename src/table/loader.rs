//! Builds [`Table`]s from retrieved JSON documents.
//!
//! Every distinct key across all records becomes a column, in first-seen
//! order. A record that lacks a key gets [`Cell::Missing`] in that column.

use serde_json::{Map, Value};
use std::collections::HashMap;

use super::{Cell, Column, Table};
use crate::error::LoadError;

/// Separator used when joining nested key paths into column names.
pub const PATH_SEPARATOR: &str = ".";

impl Table {
    /// Loads an array of flat records. Nested values are kept whole as
    /// [`Cell::Json`].
    pub fn from_records(name: &str, doc: &Value) -> Result<Table, LoadError> {
        let records = records(name, doc, false)?;
        let rows: Vec<Vec<(String, Cell)>> = records
            .into_iter()
            .map(|record| {
                record
                    .iter()
                    .map(|(k, v)| (k.clone(), Cell::from_json(v)))
                    .collect()
            })
            .collect();
        assemble(name, rows)
    }

    /// Loads possibly nested records, flattening object paths into
    /// dot-joined column names. A single top-level object is accepted as a
    /// one-record document.
    pub fn from_nested_records(name: &str, doc: &Value) -> Result<Table, LoadError> {
        let records = records(name, doc, true)?;
        let rows: Vec<Vec<(String, Cell)>> = records
            .into_iter()
            .map(|record| {
                let mut row = Vec::new();
                flatten_into(None, record, &mut row);
                row
            })
            .collect();
        assemble(name, rows)
    }
}

fn records<'a>(
    name: &str,
    doc: &'a Value,
    allow_single: bool,
) -> Result<Vec<&'a Map<String, Value>>, LoadError> {
    let items: Vec<&Value> = match doc {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) if allow_single => vec![doc],
        other => {
            return Err(LoadError::NotAnArray {
                table: name.to_string(),
                found: json_type_name(other),
            });
        }
    };

    if items.is_empty() {
        return Err(LoadError::Empty {
            table: name.to_string(),
        });
    }

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_object().ok_or_else(|| LoadError::NotARecord {
                table: name.to_string(),
                index,
            })
        })
        .collect()
}

fn flatten_into(prefix: Option<&str>, record: &Map<String, Value>, out: &mut Vec<(String, Cell)>) {
    for (key, value) in record {
        let path = match prefix {
            Some(p) => format!("{p}{PATH_SEPARATOR}{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(inner) => flatten_into(Some(&path), inner, out),
            other => out.push((path, Cell::from_json(other))),
        }
    }
}

fn assemble(name: &str, rows: Vec<Vec<(String, Cell)>>) -> Result<Table, LoadError> {
    let row_count = rows.len();
    let mut order: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut cells: Vec<Vec<Cell>> = Vec::new();

    for (row, fields) in rows.into_iter().enumerate() {
        for (key, cell) in fields {
            let col = *index.entry(key.clone()).or_insert_with(|| {
                order.push(key);
                cells.push(vec![Cell::Missing; row_count]);
                cells.len() - 1
            });
            cells[col][row] = cell;
        }
    }

    if order.is_empty() {
        return Err(LoadError::Empty {
            table: name.to_string(),
        });
    }

    let columns = order
        .into_iter()
        .zip(cells)
        .map(|(name, cells)| Column::new(name, cells))
        .collect();

    Table::from_columns(name, columns)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ColumnKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_union_of_keys_in_first_seen_order() {
        let doc = json!([
            {"question_id": 1, "selected_option": "A"},
            {"question_id": 2, "correct_option": "B"},
        ]);
        let t = Table::from_records("current", &doc).unwrap();

        assert_eq!(t.row_count(), 2);
        assert_eq!(
            t.column_names(),
            vec!["question_id", "selected_option", "correct_option"]
        );
        assert_eq!(t.column("selected_option").unwrap().cells()[1], Cell::Missing);
        assert_eq!(t.column("correct_option").unwrap().cells()[0], Cell::Missing);
    }

    #[test]
    fn test_flat_loader_keeps_nested_values() {
        let doc = json!([{"id": 1, "meta": {"source": "app"}}]);
        let t = Table::from_records("flat", &doc).unwrap();

        assert_eq!(t.column("meta").unwrap().kind(), ColumnKind::Json);
    }

    #[test]
    fn test_nested_loader_flattens_paths() {
        let doc = json!([
            {"id": 1, "quiz": {"title": "Biology", "meta": {"level": 2}}, "tags": ["a"]},
            {"id": 2, "quiz": {"title": "Physics"}},
        ]);
        let t = Table::from_nested_records("submissions", &doc).unwrap();

        assert_eq!(
            t.column_names(),
            vec!["id", "quiz.title", "quiz.meta.level", "tags"]
        );
        assert_eq!(t.column("quiz.meta.level").unwrap().cells()[1], Cell::Missing);
        assert_eq!(t.column("tags").unwrap().kind(), ColumnKind::Json);
    }

    #[test]
    fn test_nested_loader_accepts_single_object() {
        let doc = json!({"id": 9, "user": {"name": "x"}});
        let t = Table::from_nested_records("submissions", &doc).unwrap();

        assert_eq!(t.row_count(), 1);
        assert!(t.has_column("user.name"));
    }

    #[test]
    fn test_rejects_non_record_documents() {
        assert_eq!(
            Table::from_records("t", &json!({"a": 1})).unwrap_err(),
            LoadError::NotAnArray {
                table: "t".into(),
                found: "an object"
            }
        );
        assert_eq!(
            Table::from_records("t", &json!([])).unwrap_err(),
            LoadError::Empty { table: "t".into() }
        );
        assert_eq!(
            Table::from_records("t", &json!([{"a": 1}, 3])).unwrap_err(),
            LoadError::NotARecord {
                table: "t".into(),
                index: 1
            }
        );
    }

    #[test]
    fn test_records_without_keys_are_empty() {
        let err = Table::from_records("t", &json!([{}, {}])).unwrap_err();
        assert_eq!(err, LoadError::Empty { table: "t".into() });
    }
}
