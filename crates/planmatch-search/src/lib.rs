//! Semantic search of affair titles across loaded planning tables.
//!
//! One call to [`run_query`] embeds the query once, then for each table in
//! file-name order embeds its titles, scores them by cosine similarity and
//! keeps the rows above [`SIMILARITY_THRESHOLD`]. A problem with one table is
//! recorded in [`QueryReport::skipped`] and never stops the others.
use anyhow::{anyhow, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

use planmatch_core::traits::Embedder;
use planmatch_core::types::{MatchRecord, Table, TableCollection};

pub mod scorer;
pub mod selector;

pub use scorer::score;
pub use selector::{select_matches, SIMILARITY_THRESHOLD};

/// Matches grouped by source file.
pub type MatchesByFile = BTreeMap<String, Vec<MatchRecord>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "files", rename_all = "snake_case")]
pub enum QueryOutcome {
    /// The collection was empty; nothing was embedded.
    NoFilesLoaded,
    /// Files were searched but no row passed the threshold.
    NoMatches,
    /// Only files with at least one match appear.
    Matches(MatchesByFile),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    #[error("the table has no title column")]
    NoTitleColumn,
    #[error("the title column has no values")]
    EmptyColumn,
    #[error("embedding failed: {0}")]
    EmbeddingFailed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedFile {
    pub filename: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryReport {
    pub outcome: QueryOutcome,
    pub skipped: Vec<SkippedFile>,
}

impl QueryReport {
    /// Plain `filename -> matches` view; empty unless the outcome is `Matches`.
    pub fn into_matches(self) -> MatchesByFile {
        match self.outcome {
            QueryOutcome::Matches(m) => m,
            QueryOutcome::NoFilesLoaded | QueryOutcome::NoMatches => BTreeMap::new(),
        }
    }

    pub fn total_matches(&self) -> usize {
        match &self.outcome {
            QueryOutcome::Matches(m) => m.values().map(Vec::len).sum(),
            QueryOutcome::NoFilesLoaded | QueryOutcome::NoMatches => 0,
        }
    }
}

/// Search every table for titles similar to `query`.
///
/// Errors only when the query itself cannot be embedded.
pub fn run_query<E>(embedder: &E, query: &str, tables: &TableCollection) -> Result<QueryReport>
where
    E: Embedder + ?Sized,
{
    if tables.is_empty() {
        return Ok(QueryReport { outcome: QueryOutcome::NoFilesLoaded, skipped: Vec::new() });
    }

    let query_vec = embedder
        .embed_batch(&[query.to_string()])?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("embedder returned no vector for the query"))?;

    let mut matches = MatchesByFile::new();
    let mut skipped = Vec::new();
    for (filename, table) in tables.iter() {
        match search_table(embedder, &query_vec, filename, table) {
            Ok(records) if records.is_empty() => {}
            Ok(records) => {
                matches.insert(filename.to_string(), records);
            }
            Err(reason) => {
                tracing::warn!(filename, %reason, "file skipped");
                skipped.push(SkippedFile { filename: filename.to_string(), reason });
            }
        }
    }

    let outcome = if matches.is_empty() { QueryOutcome::NoMatches } else { QueryOutcome::Matches(matches) };
    Ok(QueryReport { outcome, skipped })
}

fn search_table<E>(embedder: &E, query_vec: &[f32], filename: &str, table: &Table) -> Result<Vec<MatchRecord>, SkipReason>
where
    E: Embedder + ?Sized,
{
    if table.layout().title.is_none() {
        return Err(SkipReason::NoTitleColumn);
    }
    let candidates = table.titles();
    if candidates.is_empty() {
        return Err(SkipReason::EmptyColumn);
    }

    let texts: Vec<String> = candidates.iter().map(|(_, t)| t.clone()).collect();
    let vectors = embedder.embed_batch(&texts).map_err(|e| SkipReason::EmbeddingFailed(e.to_string()))?;
    if vectors.len() != texts.len() {
        return Err(SkipReason::EmbeddingFailed(format!("{} vectors for {} titles", vectors.len(), texts.len())));
    }

    let scores = score(query_vec, &vectors);
    let records = select_matches(filename, table, &candidates, &scores, SIMILARITY_THRESHOLD);
    tracing::debug!(filename, candidates = candidates.len(), matched = records.len(), "file scored");
    Ok(records)
}
