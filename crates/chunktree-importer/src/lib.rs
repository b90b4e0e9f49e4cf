//! DAG builder primitives for chunktree.
//!
//! Turns a chunked byte stream into a fanout-bounded Merkle tree of
//! content-addressed nodes. The [`DagBuilder`] supplies the pieces a layout
//! strategy composes: a one-chunk lookahead over the source, leaf and
//! internal node construction, layer filling, position metadata for no-copy
//! imports and a batched, single commit to the store. [`DagReader`] reads a
//! finished tree back.

pub mod config;
pub mod error;
pub mod helper;
pub mod lookahead;
pub mod reader;
pub mod unixfs;

pub use config::{
    BuilderParams, ImporterConfig, NoCopy, DEFAULT_BLOCK_SIZE_LIMIT, DEFAULT_MAX_LINKS,
};
pub use error::{ImportError, ImportResult};
pub use helper::DagBuilder;
pub use lookahead::Lookahead;
pub use reader::DagReader;
pub use unixfs::{InternalNode, LeafNode, Positioned, TreeNode, WrappedLeaf};
