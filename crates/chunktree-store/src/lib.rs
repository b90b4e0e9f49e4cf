//! Content-addressed node storage for chunktree.
//!
//! Every block the importer produces is a [`Node`]: either raw bytes or an
//! ordered list of [`Link`]s plus a data payload, named by the
//! [`ContentId`](chunktree_types::ContentId) of its encoding. File chunks
//! and file roots wrap their payload in an [`FsNode`] envelope.
//!
//! # Storage Backends
//!
//! All backends implement the [`NodeStore`] trait:
//!
//! - [`InMemoryNodeStore`] -- `HashMap`-based store for tests and embedding
//! - [`FsNodeStore`] -- one file per block, fsynced on commit, with
//!   no-copy references into source files
//!
//! Writes are usually routed through a [`Batch`], which returns IDs
//! immediately and defers the physical writes until a threshold or commit.
//!
//! # Design Rules
//!
//! 1. Nodes are immutable once written (content-addressing guarantees this).
//! 2. Position info is metadata only; it never changes a node's ID.
//! 3. Nothing is durable until a successful commit.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod batch;
pub mod error;
pub mod fs;
pub mod fsnode;
pub mod memory;
pub mod node;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use batch::{Batch, BatchConfig};
pub use error::{StoreError, StoreResult};
pub use fs::FsNodeStore;
pub use fsnode::{DataType, FsNode};
pub use memory::InMemoryNodeStore;
pub use node::{FileStat, Link, Node, NodeBody, PosInfo};
pub use traits::NodeStore;
