//! Foundation types for chunktree.
//!
//! Every node written by the importer is named by a [`ContentId`]. How that
//! identifier is derived (hash function, CID version, codec) is described by
//! a [`Prefix`], which is fixed for all nodes of one tree.
//!
//! # Key Types
//!
//! - [`ContentId`]: versioned, codec-tagged content identifier
//! - [`Prefix`]: the addressing scheme used to derive a [`ContentId`]
//! - [`HashFunction`] / [`Codec`] / [`CidVersion`]: the prefix components

pub mod cid;
pub mod error;
pub mod prefix;
pub mod varint;

pub use cid::{ContentId, DIGEST_LEN};
pub use error::TypeError;
pub use prefix::{CidVersion, Codec, HashFunction, Prefix};
