//! Chunk sources for chunktree.
//!
//! A [`ChunkSource`] hands out a stream's bytes one bounded chunk at a time.
//! The boundary algorithm is the source's own business; the importer only
//! relies on the pull contract:
//!
//! - `Ok(Some(chunk))`: the next chunk, in stream order
//! - `Ok(None)`: end of stream
//! - `Err(_)`: the read failed
//!
//! [`SizeSplitter`] cuts any [`std::io::Read`] into fixed-size chunks and is
//! selected from configuration through a [`ChunkerSpec`] string such as
//! `"size-262144"`.

pub mod error;
pub mod source;
pub mod spec;
pub mod splitter;

pub use error::{ChunkError, ChunkResult};
pub use source::{ChunkSource, IterSource};
pub use spec::ChunkerSpec;
pub use splitter::{SizeSplitter, DEFAULT_CHUNK_SIZE};
