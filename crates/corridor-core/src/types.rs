//! Domain types shared by the ingestion and query pipelines.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub type EntryId = String;
pub type Meta = BTreeMap<String, String>;

/// Metadata key for the originating file.
pub const META_SOURCE: &str = "source";
/// Metadata key for the page (or section) number inside the source.
pub const META_PAGE: &str = "page";

/// A loaded source document, one per file or per PDF page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
    pub metadata: Meta,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>, metadata: Meta) -> Self {
        Self { id: id.into(), text: text.into(), metadata }
    }

    pub fn source(&self) -> Option<&str> {
        self.metadata.get(META_SOURCE).map(String::as_str)
    }
}

/// A contiguous window of a document's text.
///
/// - `id`: `<document id>:<sequence_index>`
/// - `source_metadata`: copied from the parent document
/// - `sequence_index`: zero-based position within the parent document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: EntryId,
    pub text: String,
    pub source_metadata: Meta,
    pub sequence_index: usize,
}

/// Per-collection vector layout. Fixed for the lifetime of a collection
/// generation; a re-index may change it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSchema {
    pub dimension: usize,
    pub model_id: String,
}

/// One persisted row of a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: EntryId,
    pub vector: Vec<f32>,
    pub text: String,
    pub source_metadata: Meta,
    pub collection: String,
}

impl IndexEntry {
    pub fn from_chunk(chunk: Chunk, vector: Vec<f32>, collection: &str) -> Self {
        Self {
            id: chunk.id,
            vector,
            text: chunk.text,
            source_metadata: chunk.source_metadata,
            collection: collection.to_string(),
        }
    }

    /// Human-readable citation, e.g. `docs/ruling.pdf, page 3`.
    pub fn source_ref(&self) -> String {
        let source = self.source_metadata.get(META_SOURCE).map_or("Unknown Source", String::as_str);
        match self.source_metadata.get(META_PAGE) {
            Some(page) => format!("{source}, page {page}"),
            None => source.to_string(),
        }
    }
}

/// An entry paired with its cosine similarity to the query vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredEntry {
    pub entry: IndexEntry,
    pub score: f32,
}

/// Ranked hits, best first, never longer than the requested k.
pub type RetrievalResult = Vec<ScoredEntry>;

/// The generated answer, as plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Briefing {
    pub text: String,
}

impl fmt::Display for Briefing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Result of a collaborator health check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    Available,
    Unavailable(String),
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available => f.write_str("available"),
            Self::Unavailable(reason) => write!(f, "unavailable ({reason})"),
        }
    }
}
