//! Retrieval of the raw JSON datasets.
//!
//! Each source is fetched on its own and any failure becomes an absence.
//! [`retrieve_all`] then enforces that all three documents are present.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::config::{Dataset, Endpoints};
use crate::error::RetrievalError;
use crate::parser::parse_document;

/// The three retrieved documents, all present.
#[derive(Debug, Clone)]
pub struct RawDatasets {
    pub current_quiz: Value,
    pub submissions: Value,
    pub historical_quiz: Value,
}

pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}

/// Loads a source over HTTP when it looks like a URL, from disk otherwise.
#[tracing::instrument(skip(client))]
pub async fn load_source<C: HttpClient>(client: &C, source: &str) -> Result<Vec<u8>> {
    let bytes = if source.starts_with("http://") || source.starts_with("https://") {
        fetch_bytes(client, source).await?
    } else {
        tokio::fs::read(source)
            .await
            .with_context(|| format!("failed to read {source}"))?
    };
    debug!(bytes = bytes.len(), "Source loaded");
    Ok(bytes)
}

async fn fetch_document<C: HttpClient>(client: &C, source: &str) -> Result<Value> {
    let bytes = load_source(client, source).await?;
    parse_document(&bytes)
}

/// Fetches and parses one source. Errors are logged and reported as `None`.
pub async fn retrieve<C: HttpClient>(client: &C, source: &str) -> Option<Value> {
    match fetch_document(client, source).await {
        Ok(doc) => Some(doc),
        Err(e) => {
            error!(source, error = %format!("{e:#}"), "Error fetching data");
            None
        }
    }
}

async fn retrieve_dataset<C: HttpClient>(
    client: &C,
    endpoints: &Endpoints,
    dataset: Dataset,
) -> Option<Value> {
    let source = endpoints.get(dataset);
    info!(dataset = dataset.label(), source, "Fetching dataset");
    retrieve(client, source).await
}

/// Retrieves every dataset in order, failing unless all of them arrive.
pub async fn retrieve_all<C: HttpClient>(
    client: &C,
    endpoints: &Endpoints,
) -> std::result::Result<RawDatasets, RetrievalError> {
    let current_quiz = retrieve_dataset(client, endpoints, Dataset::CurrentQuiz).await;
    let submissions = retrieve_dataset(client, endpoints, Dataset::Submissions).await;
    let historical_quiz = retrieve_dataset(client, endpoints, Dataset::HistoricalQuiz).await;

    match (current_quiz, submissions, historical_quiz) {
        (Some(current_quiz), Some(submissions), Some(historical_quiz)) => Ok(RawDatasets {
            current_quiz,
            submissions,
            historical_quiz,
        }),
        (current_quiz, submissions, historical_quiz) => {
            let present = [
                current_quiz.is_some(),
                submissions.is_some(),
                historical_quiz.is_some(),
            ];
            let missing = Dataset::ALL
                .iter()
                .zip(present)
                .filter(|(_, present)| !present)
                .map(|(dataset, _)| dataset.label().to_string())
                .collect();
            Err(RetrievalError::Incomplete { missing })
        }
    }
}
