//! Smoke check of a built collection: one fixed sample query.

use serde::Serialize;

use corridor_core::error::{Error, Result};
use corridor_core::traits::VectorIndex;
use corridor_core::types::{META_PAGE, META_SOURCE};

use crate::retriever::Retriever;

pub const SAMPLE_QUERY: &str = "court decision regarding land ownership and conservation";
pub const SAMPLE_K: usize = 2;
const SNIPPET_CHARS: usize = 150;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifyHit {
    pub source: String,
    pub page: Option<String>,
    pub score: f32,
    pub snippet: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifyReport {
    pub collection: String,
    pub query: String,
    pub hits: Vec<VerifyHit>,
}

impl VerifyReport {
    pub fn passed(&self) -> bool {
        !self.hits.is_empty()
    }
}

pub async fn verify(index: &dyn VectorIndex, retriever: &Retriever) -> Result<VerifyReport> {
    verify_with(index, retriever, SAMPLE_QUERY, SAMPLE_K).await
}

pub async fn verify_with(index: &dyn VectorIndex, retriever: &Retriever, query: &str, k: usize) -> Result<VerifyReport> {
    let collection = retriever.collection();
    if !index.exists(collection).await? {
        return Err(Error::CollectionNotFound(collection.to_string()));
    }
    let hits = retriever
        .retrieve(query, k)
        .await?
        .into_iter()
        .map(|hit| {
            let meta = &hit.entry.source_metadata;
            VerifyHit {
                source: meta.get(META_SOURCE).cloned().unwrap_or_else(|| "Unknown Source".to_string()),
                page: meta.get(META_PAGE).cloned(),
                score: hit.score,
                snippet: snippet(&hit.entry.text),
            }
        })
        .collect();
    Ok(VerifyReport { collection: collection.to_string(), query: query.to_string(), hits })
}

fn snippet(text: &str) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= SNIPPET_CHARS {
        return flat;
    }
    let cut: String = flat.chars().take(SNIPPET_CHARS).collect();
    format!("{cut}...")
}
