//! Shared building blocks for the corridor briefing engine: domain types,
//! errors, configuration, collaborator traits, the chunker, the corpus loader
//! and the upstream call policy.

pub mod chunker;
pub mod config;
pub mod error;
pub mod loader;
pub mod traits;
pub mod types;
pub mod upstream;

pub use error::{Error, Result};
