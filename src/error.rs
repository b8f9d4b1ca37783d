//! Error types surfaced by the library.
//!
//! Application plumbing stays on `anyhow`; these variants exist where a
//! caller (or a test) needs to tell failures apart.

use thiserror::Error;

/// Failure to turn a JSON document into a [`Table`](crate::table::Table).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("{table}: expected a JSON array of records, found {found}")]
    NotAnArray { table: String, found: &'static str },

    #[error("{table}: document contains no records")]
    Empty { table: String },

    #[error("{table}: element {index} is not a JSON object")]
    NotARecord { table: String, index: usize },

    #[error("{table}: column '{column}' has {found} cells, expected {expected}")]
    RaggedColumn {
        table: String,
        column: String,
        expected: usize,
        found: usize,
    },
}

/// Failure of the all-or-nothing retrieval precondition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RetrievalError {
    #[error("One or more datasets could not be fetched: {}", .missing.join(", "))]
    Incomplete { missing: Vec<String> },
}
