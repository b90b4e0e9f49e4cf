use chunktree_types::ContentId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StoreResult;
use crate::node::Node;
use crate::traits::NodeStore;

/// Thresholds that trigger an incremental flush of staged nodes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Flush once this many nodes are pending.
    pub max_pending_nodes: usize,
    /// Flush once the pending nodes' encoded sizes reach this many bytes.
    pub max_pending_bytes: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_pending_nodes: 128,
            max_pending_bytes: 8 * 1024 * 1024, // 8 MiB
        }
    }
}

/// Write batcher in front of a [`NodeStore`].
///
/// `stage` hands back the node's ID immediately so parents can link to it
/// before it is written. Staged nodes are pushed to the store in groups once
/// a [`BatchConfig`] threshold is crossed, and [`Batch::commit`] pushes the
/// remainder and asks the store to make everything durable.
///
/// A batch is owned by exactly one builder; the store is borrowed.
pub struct Batch<'a, S: NodeStore + ?Sized> {
    store: &'a S,
    config: BatchConfig,
    pending: Vec<Node>,
    pending_bytes: usize,
    /// Nodes were handed to the store since the last successful commit.
    dirty: bool,
}

impl<'a, S: NodeStore + ?Sized> Batch<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self::with_config(store, BatchConfig::default())
    }

    pub fn with_config(store: &'a S, config: BatchConfig) -> Self {
        Self {
            store,
            config,
            pending: Vec::new(),
            pending_bytes: 0,
            dirty: false,
        }
    }

    pub fn store(&self) -> &'a S {
        self.store
    }

    /// Queue `node` for writing and return its ID.
    pub fn stage(&mut self, node: Node) -> StoreResult<ContentId> {
        let (encoded, id) = node.encode_with_cid()?;
        self.pending_bytes += encoded.len();
        self.pending.push(node);

        if self.pending.len() >= self.config.max_pending_nodes
            || self.pending_bytes >= self.config.max_pending_bytes
        {
            self.flush()?;
        }
        Ok(id)
    }

    /// Write `node` to the store immediately, bypassing the pending set.
    ///
    /// The node still becomes durable at the next [`Batch::commit`].
    pub fn put_now(&mut self, node: &Node) -> StoreResult<ContentId> {
        let id = self.store.put(node)?;
        self.dirty = true;
        Ok(id)
    }

    /// Hand every pending node to the store without committing.
    ///
    /// On failure the pending set is left untouched.
    pub fn flush(&mut self) -> StoreResult<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        self.store.put_many(&self.pending)?;
        debug!(
            count = self.pending.len(),
            bytes = self.pending_bytes,
            "batch flushed"
        );
        self.pending.clear();
        self.pending_bytes = 0;
        self.dirty = true;
        Ok(())
    }

    /// Flush and make every staged node durable.
    ///
    /// Committing again with nothing staged in between does nothing.
    pub fn commit(&mut self) -> StoreResult<()> {
        self.flush()?;
        if !self.dirty {
            return Ok(());
        }
        self.store.commit()?;
        self.dirty = false;
        debug!("batch committed");
        Ok(())
    }

    /// Number of staged nodes not yet handed to the store.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending_bytes(&self) -> usize {
        self.pending_bytes
    }
}
