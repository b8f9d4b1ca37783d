//! JSON document parser for retrieved datasets.

use anyhow::{Context, Result};
use serde_json::Value;

/// Decodes a retrieved payload into a JSON document.
///
/// # Errors
///
/// Returns an error if the bytes are not valid JSON.
pub fn parse_document(bytes: &[u8]) -> Result<Value> {
    serde_json::from_slice(bytes).context("response body is not valid JSON")
}
