use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use crate::table::{Cell, Table};

/// Column holding the per-attempt score that grouped means are taken over.
pub const SCORE_COLUMN: &str = "score";

/// Grouping columns reported by [`performance_breakdowns`], with their titles.
pub const PERFORMANCE_GROUPINGS: [(&str, &str); 3] = [
    ("topic", "Topic Performance"),
    ("difficulty_level", "Difficulty Performance"),
    ("response_accuracy", "Accuracy Performance"),
];

/// Arithmetic mean. `None` for empty input, since the mean of nothing is
/// undefined.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation given a pre-computed mean.
/// Returns 0.0 for empty input.
pub fn stddev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;

    variance.sqrt()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    pub stddev: f64,
    pub min: f64,
    pub max: f64,
}

impl NumericSummary {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mean = mean(values)?;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            count: values.len(),
            mean,
            stddev: stddev(values, mean),
            min,
            max,
        })
    }
}

/// A distinct grouping value. Orders booleans first, then numbers, then text.
#[derive(Debug, Clone)]
pub enum GroupKey {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl GroupKey {
    /// `None` for missing cells and for values that cannot act as a key.
    pub fn from_cell(cell: &Cell) -> Option<Self> {
        match cell {
            Cell::Bool(b) => Some(GroupKey::Bool(*b)),
            Cell::Int(_) | Cell::Float(_) => cell.as_f64().map(GroupKey::Number),
            Cell::Text(s) => Some(GroupKey::Text(s.clone())),
            Cell::Missing | Cell::Json(_) => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            GroupKey::Bool(_) => 0,
            GroupKey::Number(_) => 1,
            GroupKey::Text(_) => 2,
        }
    }
}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (GroupKey::Bool(a), GroupKey::Bool(b)) => a.cmp(b),
            (GroupKey::Number(a), GroupKey::Number(b)) => a.total_cmp(b),
            (GroupKey::Text(a), GroupKey::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GroupKey {}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Bool(b) => write!(f, "{b}"),
            GroupKey::Number(n) => write!(f, "{n}"),
            GroupKey::Text(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupMean {
    pub key: GroupKey,
    pub rows: usize,
    /// `None` when no row in the group had a numeric value.
    pub mean: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupedMeans {
    pub by: String,
    pub value: String,
    pub groups: Vec<GroupMean>,
}

/// Outcome of a column-guarded aggregation.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregation {
    Computed(GroupedMeans),
    Skipped { missing_column: String },
}

/// Mean of `value` for each distinct non-missing value of `by`, sorted by key.
///
/// Skips, rather than fails, when either column is absent.
pub fn group_mean(table: &Table, by: &str, value: &str) -> Aggregation {
    let (Some(keys), Some(values)) = (table.column(by), table.column(value)) else {
        let missing = if table.has_column(by) { value } else { by };
        return Aggregation::Skipped {
            missing_column: missing.to_string(),
        };
    };

    let mut groups: BTreeMap<GroupKey, (usize, Vec<f64>)> = BTreeMap::new();
    for (key, cell) in keys.cells().iter().zip(values.cells()) {
        let Some(key) = GroupKey::from_cell(key) else {
            continue;
        };
        let entry = groups.entry(key).or_default();
        entry.0 += 1;
        if let Some(v) = cell.as_f64() {
            entry.1.push(v);
        }
    }

    Aggregation::Computed(GroupedMeans {
        by: by.to_string(),
        value: value.to_string(),
        groups: groups
            .into_iter()
            .map(|(key, (rows, values))| GroupMean {
                key,
                rows,
                mean: mean(&values),
            })
            .collect(),
    })
}

/// Mean score per topic, difficulty level and response accuracy.
pub fn performance_breakdowns(table: &Table) -> Vec<(&'static str, Aggregation)> {
    PERFORMANCE_GROUPINGS
        .iter()
        .map(|(by, title)| (*title, group_mean(table, by, SCORE_COLUMN)))
        .collect()
}

/// Occurrences of each distinct non-missing value of `column`, sorted by key.
pub fn value_counts(table: &Table, column: &str) -> Option<Vec<(GroupKey, usize)>> {
    let column = table.column(column)?;
    let mut counts: BTreeMap<GroupKey, usize> = BTreeMap::new();
    for key in column.cells().iter().filter_map(GroupKey::from_cell) {
        *counts.entry(key).or_default() += 1;
    }
    Some(counts.into_iter().collect())
}
