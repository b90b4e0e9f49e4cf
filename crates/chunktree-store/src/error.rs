use chunktree_types::{ContentId, TypeError};

/// Errors from node store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested node was not found.
    #[error("node not found: {0}")]
    NotFound(ContentId),

    /// Content hash mismatch on read (data corruption).
    #[error("hash mismatch for {id}: computed {computed}")]
    HashMismatch { id: ContentId, computed: ContentId },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The node data is malformed or cannot be decoded.
    #[error("corrupt node {id}: {reason}")]
    CorruptNode { id: ContentId, reason: String },

    /// A file referenced by a no-copy entry no longer matches what was added.
    #[error("referenced file {path} changed since it was added")]
    StaleReference { path: String },

    /// Malformed identifier or prefix.
    #[error(transparent)]
    Type(#[from] TypeError),

    /// Storage backend is read-only or otherwise unavailable.
    #[error("store is read-only")]
    ReadOnly,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
