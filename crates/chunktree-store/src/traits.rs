use chunktree_types::{ContentId, Prefix};

use crate::error::StoreResult;
use crate::node::Node;

/// Content-addressed node store.
///
/// All implementations must satisfy these invariants:
/// - Nodes are immutable once written. The same encoded block under the same
///   prefix always produces the same ID, so writes are idempotent.
/// - `put` may defer durability; only a successful `commit` guarantees every
///   node accepted so far survives a crash.
/// - Position info attached to a node is metadata only and never changes
///   its ID.
/// - All I/O errors are propagated, never silently ignored.
pub trait NodeStore: Send + Sync {
    /// Addressing scheme used when a builder does not configure its own.
    fn default_prefix(&self) -> Prefix {
        Prefix::v0()
    }

    /// Accept a node and return its content-addressed ID.
    fn put(&self, node: &Node) -> StoreResult<ContentId>;

    /// Accept several nodes, returning their IDs in order.
    ///
    /// Default implementation calls `put()` for each node. Backends may
    /// override for better performance.
    fn put_many(&self, nodes: &[Node]) -> StoreResult<Vec<ContentId>> {
        nodes.iter().map(|node| self.put(node)).collect()
    }

    /// Read a node by ID. Returns `Ok(None)` if it does not exist.
    fn get(&self, id: &ContentId) -> StoreResult<Option<Node>>;

    /// Check whether a node exists.
    fn has(&self, id: &ContentId) -> StoreResult<bool>;

    /// Make every node accepted so far durable.
    fn commit(&self) -> StoreResult<()> {
        Ok(())
    }
}
