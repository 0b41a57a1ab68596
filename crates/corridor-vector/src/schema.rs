use arrow_schema::{DataType, Field, Schema, TimeUnit};
use std::sync::Arc;

use corridor_core::error::{Error, Result};

/// Columns of a collection generation table. `seq` preserves insertion
/// order for tie-breaking; `metadata` is the JSON-encoded source metadata.
pub fn build_entries_schema(dim: usize) -> Result<Arc<Schema>> {
    let width = i32::try_from(dim)
        .ok()
        .filter(|d| *d > 0)
        .ok_or_else(|| Error::InvalidConfig(format!("unsupported embedding dimension {dim}")))?;
    Ok(Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("seq", DataType::Int64, false),
        Field::new("text", DataType::Utf8, false),
        Field::new("metadata", DataType::Utf8, false),
        Field::new("vector", DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), width), true),
    ])))
}

pub fn build_meta_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("key", DataType::Utf8, false),
        Field::new("value", DataType::Utf8, false),
        Field::new("updated_at", DataType::Timestamp(TimeUnit::Millisecond, None), false),
    ]))
}
