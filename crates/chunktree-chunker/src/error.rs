use thiserror::Error;

/// Errors produced while reading chunks.
#[derive(Debug, Error)]
pub enum ChunkError {
    /// The underlying reader failed.
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("chunk size must be non-zero")]
    ZeroChunkSize,

    /// A chunker specification string could not be parsed.
    #[error("invalid chunker spec {spec:?}: {reason}")]
    InvalidSpec { spec: String, reason: String },
}

/// Result alias for chunk operations.
pub type ChunkResult<T> = Result<T, ChunkError>;
