use thiserror::Error;

/// All errors produced by recital-core.
///
/// The matching and rendering functions never fail; only the components
/// that talk to external collaborators (synthesis, recognition, lookup,
/// config files) return these.
#[derive(Debug, Error)]
pub enum RecitalError {
    #[error("synthesis error: {0}")]
    Synthesis(String),

    #[error("recognition error: {0}")]
    Recognition(String),

    #[error("sentence index {index} out of range (document has {len} sentences)")]
    SentenceOutOfRange { index: usize, len: usize },

    #[error("lookup service is not initialised")]
    LookupUnavailable,

    #[error("lookup error: {0}")]
    Lookup(String),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RecitalError>;
