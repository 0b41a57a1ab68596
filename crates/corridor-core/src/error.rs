use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No documents to index: the corpus is empty")]
    EmptyCorpus,

    #[error("Dimension mismatch: collection expects {expected}-dimensional vectors, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Collection '{0}' not found; run `corridor index` to build it first")]
    CollectionNotFound(String),

    #[error("Query is empty; please enter a question")]
    EmptyQuery,

    #[error("{service} did not respond within {}s", .after.as_secs())]
    UpstreamTimeout { service: String, after: Duration },

    #[error("{service} rate limit exceeded: {message}")]
    UpstreamRateLimited { service: String, message: String },

    #[error("{service} rejected the credentials: {message}")]
    UpstreamAuthFailure { service: String, message: String },

    /// Any other upstream failure; `transient` marks 5xx/connection errors.
    #[error("{service} request failed: {message}")]
    Upstream { service: String, message: String, transient: bool },

    #[error("Embedding model error: {0}")]
    Model(String),

    #[error("Index storage error: {0}")]
    Storage(String),

    #[error("Failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn storage(e: impl std::fmt::Display) -> Self {
        Self::Storage(e.to_string())
    }

    pub fn model(e: impl std::fmt::Display) -> Self {
        Self::Model(e.to_string())
    }

    pub fn parse(what: impl Into<String>, e: impl std::fmt::Display) -> Self {
        Self::Parse { what: what.into(), message: e.to_string() }
    }

    /// Map a non-success HTTP status from `service` onto the upstream taxonomy.
    pub fn from_status(service: &str, status: u16, body: &str) -> Self {
        let service = service.to_string();
        let message = format!("HTTP {status}: {}", body.trim());
        match status {
            401 | 403 => Self::UpstreamAuthFailure { service, message },
            429 => Self::UpstreamRateLimited { service, message },
            500..=599 => Self::Upstream { service, message, transient: true },
            _ => Self::Upstream { service, message, transient: false },
        }
    }

    /// Failure raised by the HTTP client before a status was received.
    /// Connect, timeout and send failures may be retried; a request that
    /// could not be built or a body that could not be decoded may not.
    pub fn transport(service: &str, e: &reqwest::Error) -> Self {
        let transient = !e.is_builder() && !e.is_decode() && (e.is_connect() || e.is_timeout() || e.is_request());
        Self::Upstream { service: service.to_string(), message: e.to_string(), transient }
    }

    /// Whether a failed upstream call may succeed if issued again.
    ///
    /// Timeouts are not transient here: a timed-out request is surfaced as-is.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::UpstreamRateLimited { .. } => true,
            Self::Upstream { transient, .. } => *transient,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
