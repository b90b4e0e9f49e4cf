//! Content hashing for chunktree.
//!
//! Turns encoded node bytes into a [`ContentId`](chunktree_types::ContentId)
//! under a given [`Prefix`](chunktree_types::Prefix). All crypto operations
//! wrap established libraries; there is no custom cryptography.

pub mod hasher;

pub use hasher::{digest, ContentHasher};
