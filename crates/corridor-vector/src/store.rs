//! `VectorIndex` over an embedded LanceDB directory.
//!
//! Every upsert writes a fresh generation table `<collection>__g<n>` and then
//! flips the `active:<collection>` pointer in the meta table. Readers resolve
//! the pointer once per query, so they see the old or the new generation and
//! never a partially written one. The generation before the active one is
//! kept for in-flight readers; anything older is pruned.

use arrow_array::{Array, FixedSizeListArray, Float32Array, Int64Array, RecordBatch, RecordBatchIterator, StringArray};
use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{Connection, DistanceType};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use corridor_core::error::{Error, Result};
use corridor_core::traits::VectorIndex;
use corridor_core::types::{Availability, CollectionSchema, IndexEntry, Meta, RetrievalResult, ScoredEntry};

use crate::schema::build_entries_schema;
use crate::table::{get_meta, open_db, set_meta};

const GENERATION_SEP: &str = "__g";

/// Pointer record stored under `active:<collection>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveGeneration {
    pub table: String,
    pub dimension: usize,
    pub model_id: String,
    pub entries: usize,
    pub created_at: String,
}

impl ActiveGeneration {
    pub fn schema(&self) -> CollectionSchema {
        CollectionSchema { dimension: self.dimension, model_id: self.model_id.clone() }
    }
}

pub struct LanceIndex {
    uri: PathBuf,
    conn: OnceCell<Connection>,
}

impl LanceIndex {
    /// Does not touch the filesystem; the directory is created on first write.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self { uri: path.as_ref().to_path_buf(), conn: OnceCell::new() }
    }

    pub fn path(&self) -> &Path {
        &self.uri
    }

    async fn conn(&self) -> Result<&Connection> {
        self.conn
            .get_or_try_init(|| async {
                let uri = self.uri.to_string_lossy();
                open_db(uri.as_ref()).await.map_err(Error::storage)
            })
            .await
    }

    /// Active generation of `name`, or `None` when it was never indexed.
    pub async fn describe(&self, name: &str) -> Result<Option<ActiveGeneration>> {
        validate_name(name)?;
        if !self.uri.is_dir() {
            return Ok(None);
        }
        let conn = self.conn().await?;
        let Some(raw) = get_meta(conn, &pointer_key(name)).await.map_err(Error::storage)? else {
            return Ok(None);
        };
        let active = serde_json::from_str(&raw).map_err(|e| Error::parse("collection pointer", e))?;
        Ok(Some(active))
    }

    async fn next_generation(&self, conn: &Connection, name: &str) -> Result<String> {
        let existing = conn.table_names().execute().await.map_err(Error::storage)?;
        let mut stamp = Utc::now().timestamp_millis();
        loop {
            let candidate = format!("{name}{GENERATION_SEP}{stamp}");
            if !existing.contains(&candidate) {
                return Ok(candidate);
            }
            stamp += 1;
        }
    }

    async fn prune(conn: &Connection, name: &str, keep: &[&str]) -> Result<()> {
        let names = conn.table_names().execute().await.map_err(Error::storage)?;
        for table in names.iter().filter(|t| is_generation_of(t, name) && !keep.contains(&t.as_str())) {
            match conn.drop_table(table, &[]).await {
                Ok(()) => debug!(table = %table, "Pruned stale generation"),
                Err(e) => warn!(table = %table, error = %e, "Failed to prune stale generation"),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for LanceIndex {
    async fn upsert_collection(&self, name: &str, schema: &CollectionSchema, entries: &[IndexEntry]) -> Result<()> {
        validate_name(name)?;
        if let Some(bad) = entries.iter().find(|e| e.vector.len() != schema.dimension) {
            return Err(Error::DimensionMismatch { expected: schema.dimension, actual: bad.vector.len() });
        }
        let arrow_schema = build_entries_schema(schema.dimension)?;

        let start = Instant::now();
        tokio::fs::create_dir_all(&self.uri).await?;
        let conn = self.conn().await?;
        let previous = self.describe(name).await?;
        let table = self.next_generation(conn, name).await?;

        let batches = if entries.is_empty() { vec![] } else { vec![Ok(entries_to_record_batch(entries, &arrow_schema)?)] };
        let reader = RecordBatchIterator::new(batches.into_iter(), arrow_schema.clone());
        conn.create_table(&table, Box::new(reader)).execute().await.map_err(Error::storage)?;

        let active = ActiveGeneration {
            table: table.clone(),
            dimension: schema.dimension,
            model_id: schema.model_id.clone(),
            entries: entries.len(),
            created_at: Utc::now().to_rfc3339(),
        };
        let pointer = serde_json::to_string(&active).map_err(|e| Error::parse("collection pointer", e))?;
        set_meta(conn, &pointer_key(name), &pointer).await.map_err(Error::storage)?;

        let mut keep = vec![table.as_str()];
        if let Some(prev) = previous.as_ref() {
            keep.push(prev.table.as_str());
        }
        Self::prune(conn, name, &keep).await?;

        info!(collection = name, generation = %table, entries = entries.len(), elapsed_ms = start.elapsed().as_millis() as u64, "Collection replaced");
        Ok(())
    }

    async fn query(&self, name: &str, query_vector: &[f32], k: usize) -> Result<RetrievalResult> {
        let active = self.describe(name).await?.ok_or_else(|| Error::CollectionNotFound(name.to_string()))?;
        if query_vector.len() != active.dimension {
            return Err(Error::DimensionMismatch { expected: active.dimension, actual: query_vector.len() });
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let conn = self.conn().await?;
        let table = conn.open_table(&active.table).execute().await.map_err(Error::storage)?;
        let total = table.count_rows(None).await.map_err(Error::storage)?;
        if total == 0 {
            return Ok(Vec::new());
        }

        // Rank every row so equal scores can be ordered by insertion sequence.
        let mut stream = table
            .vector_search(query_vector.to_vec())
            .map_err(Error::storage)?
            .distance_type(DistanceType::Cosine)
            .limit(total)
            .execute()
            .await
            .map_err(Error::storage)?;

        let mut hits: Vec<(i64, ScoredEntry)> = Vec::with_capacity(total);
        while let Some(batch) = stream.try_next().await.map_err(Error::storage)? {
            read_hits(&batch, name, &mut hits)?;
        }
        hits.sort_by(|(seq_a, a), (seq_b, b)| {
            b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal).then(seq_a.cmp(seq_b))
        });
        hits.truncate(k);
        debug!(collection = name, k, returned = hits.len(), "Vector query");
        Ok(hits.into_iter().map(|(_, hit)| hit).collect())
    }

    async fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.describe(name).await?.is_some())
    }

    async fn health_check(&self) -> Availability {
        if !self.uri.is_dir() {
            return Availability::Unavailable(format!("index directory {} does not exist", self.uri.display()));
        }
        match self.conn().await {
            Ok(conn) => match conn.table_names().execute().await {
                Ok(_) => Availability::Available,
                Err(e) => Availability::Unavailable(e.to_string()),
            },
            Err(e) => Availability::Unavailable(e.to_string()),
        }
    }
}

/// Collection names become table names and path components.
pub fn validate_name(name: &str) -> Result<()> {
    let ok = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!("collection name '{name}' may only contain letters, digits, '_' and '-'")))
    }
}

fn pointer_key(name: &str) -> String {
    format!("active:{name}")
}

fn is_generation_of(table: &str, name: &str) -> bool {
    table
        .strip_prefix(name)
        .and_then(|rest| rest.strip_prefix(GENERATION_SEP))
        .is_some_and(|stamp| !stamp.is_empty() && stamp.chars().all(|c| c.is_ascii_digit()))
}

fn entries_to_record_batch(entries: &[IndexEntry], schema: &Arc<arrow_schema::Schema>) -> Result<RecordBatch> {
    let dim = entries.first().map_or(0, |e| e.vector.len());
    let width = i32::try_from(dim).map_err(|_| Error::InvalidConfig(format!("unsupported embedding dimension {dim}")))?;

    let mut ids = Vec::with_capacity(entries.len());
    let mut seqs = Vec::with_capacity(entries.len());
    let mut texts = Vec::with_capacity(entries.len());
    let mut metas = Vec::with_capacity(entries.len());
    let mut vectors: Vec<Option<Vec<Option<f32>>>> = Vec::with_capacity(entries.len());
    for (seq, entry) in entries.iter().enumerate() {
        ids.push(entry.id.clone());
        seqs.push(seq as i64);
        texts.push(entry.text.clone());
        metas.push(serde_json::to_string(&entry.source_metadata).map_err(|e| Error::parse("entry metadata", e))?);
        vectors.push(Some(entry.vector.iter().map(|&x| Some(x)).collect()));
    }

    RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(ids)),
            Arc::new(Int64Array::from(seqs)),
            Arc::new(StringArray::from(texts)),
            Arc::new(StringArray::from(metas)),
            Arc::new(FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(vectors.into_iter(), width)),
        ],
    )
    .map_err(Error::storage)
}

fn column<'a, T: 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<T>())
        .ok_or_else(|| Error::storage(format!("column `{name}` missing or of unexpected type")))
}

fn read_hits(batch: &RecordBatch, collection: &str, out: &mut Vec<(i64, ScoredEntry)>) -> Result<()> {
    let ids = column::<StringArray>(batch, "id")?;
    let seqs = column::<Int64Array>(batch, "seq")?;
    let texts = column::<StringArray>(batch, "text")?;
    let metas = column::<StringArray>(batch, "metadata")?;
    let vectors = column::<FixedSizeListArray>(batch, "vector")?;
    let distances = column::<Float32Array>(batch, "_distance")?;

    for i in 0..batch.num_rows() {
        let source_metadata: Meta = serde_json::from_str(metas.value(i)).map_err(|e| Error::parse("entry metadata", e))?;
        let vector = vectors
            .value(i)
            .as_any()
            .downcast_ref::<Float32Array>()
            .map(|v| v.values().to_vec())
            .unwrap_or_default();
        // Zero vectors yield NaN distances.
        let score = if distances.is_null(i) { 0.0 } else { 1.0 - distances.value(i) };
        let score = if score.is_nan() { 0.0 } else { score };
        let entry = IndexEntry {
            id: ids.value(i).to_string(),
            vector,
            text: texts.value(i).to_string(),
            source_metadata,
            collection: collection.to_string(),
        };
        out.push((seqs.value(i), ScoredEntry { entry, score }));
    }
    Ok(())
}
