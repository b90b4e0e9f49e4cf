use chunktree_chunker::ChunkError;
use chunktree_store::StoreError;
use chunktree_types::{ContentId, TypeError};

/// Errors raised while building or reading a chunk tree.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// A chunk is larger than the configured block size limit.
    #[error("block of {size} bytes exceeds the {limit} byte limit")]
    SizeLimitExceeded { size: usize, limit: usize },

    /// The chunk source failed to produce the next chunk.
    #[error("chunk source failed: {0}")]
    Source(#[from] ChunkError),

    /// The node store rejected a write or commit.
    #[error("store failure: {0}")]
    Store(#[from] StoreError),

    /// Configuration values are inconsistent or out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Type(#[from] TypeError),

    /// Reading configuration or source-file metadata failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A node reachable from a tree root is missing from the store.
    #[error("node not found: {0}")]
    NotFound(ContentId),

    /// A node in a tree is not something a file can be assembled from.
    #[error("unexpected node {id}: {reason}")]
    UnexpectedNode { id: ContentId, reason: String },
}

/// Result alias for importer operations.
pub type ImportResult<T> = Result<T, ImportError>;
