//! Ingestion and query orchestration for corridor briefings.
//!
//! `Pipeline` owns the long-lived clients; `Ingestor`, `Retriever` and
//! `QueryOrchestrator` are cheap views over them.

pub mod answer;
pub mod ingest;
pub mod pipeline;
pub mod retriever;
pub mod verify;

pub use answer::{Answer, QueryOrchestrator};
pub use ingest::{IngestOptions, IngestionReport, Ingestor};
pub use pipeline::{HealthReport, Pipeline};
pub use retriever::{Retriever, DEFAULT_TOP_K};
pub use verify::{verify, verify_with, VerifyHit, VerifyReport, SAMPLE_QUERY};
