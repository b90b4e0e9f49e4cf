use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("unknown multicodec 0x{0:x}")]
    UnknownCodec(u64),

    #[error("unknown hash function 0x{0:x}")]
    UnknownHashFunction(u64),

    #[error("unsupported CID version {0}")]
    UnsupportedVersion(u64),

    #[error("CIDv0 requires dag-pb and sha2-256, got {codec} and {hash}")]
    InvalidV0Prefix { codec: String, hash: String },

    #[error("truncated varint")]
    TruncatedVarint,

    #[error("varint overflow")]
    VarintOverflow,
}
