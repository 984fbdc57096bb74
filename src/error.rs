//! Error types for Lectio.

use thiserror::Error;

/// Library-level error type for Lectio operations.
#[derive(Error, Debug)]
pub enum LectioError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid chunk: {0}")]
    Validation(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedding model mismatch: corpus was built with '{corpus}', query uses '{query}'")]
    ModelMismatch { corpus: String, query: String },

    #[error("Embedding service unavailable after {attempts} attempts: {message}")]
    EmbeddingUnavailable { attempts: usize, message: String },

    #[error("Generation service unavailable after {attempts} attempts: {message}")]
    GenerationUnavailable { attempts: usize, message: String },

    #[error("Question is empty")]
    EmptyQuery,

    #[error("No corpus snapshot loaded: {0}")]
    CorpusNotLoaded(String),

    #[error("Ingestion produced no chunks: {0}")]
    EmptyCorpus(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),
}

/// Result type alias for Lectio operations.
pub type Result<T> = std::result::Result<T, LectioError>;
