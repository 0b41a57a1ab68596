use crate::error::{Error, Result};
use crate::types::{Chunk, Document};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: 1000, chunk_overlap: 200 }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 || self.chunk_overlap == 0 {
            return Err(Error::InvalidConfig(format!(
                "chunk_size ({}) and chunk_overlap ({}) must both be positive",
                self.chunk_size, self.chunk_overlap
            )));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }

    fn step(&self) -> usize {
        self.chunk_size - self.chunk_overlap
    }
}

/// Fixed-width character window splitter.
///
/// Lengths are counted in `char`s. The window advances by
/// `chunk_size - chunk_overlap`, so neighbouring chunks share exactly
/// `chunk_overlap` characters.
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn split(&self, document: &Document) -> Vec<Chunk> {
        let text = document.text.as_str();
        // Byte offset of every char boundary, including the end of the text.
        let bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect();
        let len = bounds.len() - 1;
        if len == 0 {
            return Vec::new();
        }

        let mut chunks = Vec::new();
        let mut start = 0usize;
        loop {
            let end = (start + self.config.chunk_size).min(len);
            chunks.push(Chunk {
                id: format!("{}:{}", document.id, chunks.len()),
                text: text[bounds[start]..bounds[end]].to_string(),
                source_metadata: document.metadata.clone(),
                sequence_index: chunks.len(),
            });
            if end >= len {
                break;
            }
            start += self.config.step();
        }
        chunks
    }

    pub fn split_all(&self, documents: &[Document]) -> Vec<Chunk> {
        documents.iter().flat_map(|d| self.split(d)).collect()
    }
}

/// Convenience wrapper validating the parameters on every call.
pub fn split(document: &Document, chunk_size: usize, chunk_overlap: usize) -> Result<Vec<Chunk>> {
    Ok(Chunker::new(ChunkingConfig { chunk_size, chunk_overlap })?.split(document))
}
