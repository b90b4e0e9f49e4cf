use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use chunktree_types::{ContentId, Prefix};

use crate::error::StoreResult;
use crate::node::Node;
use crate::traits::NodeStore;

/// In-memory, HashMap-based node store.
///
/// Intended for tests and embedding. All nodes are held in memory behind a
/// `RwLock`; nodes are cloned on read/write. `commit` has nothing to flush
/// and only counts how often it was called.
pub struct InMemoryNodeStore {
    nodes: RwLock<HashMap<ContentId, Node>>,
    default_prefix: Prefix,
    commits: AtomicUsize,
}

impl InMemoryNodeStore {
    /// Create a new empty store with the v0 default prefix.
    pub fn new() -> Self {
        Self::with_default_prefix(Prefix::v0())
    }

    pub fn with_default_prefix(default_prefix: Prefix) -> Self {
        Self {
            nodes: RwLock::new(HashMap::new()),
            default_prefix,
            commits: AtomicUsize::new(0),
        }
    }

    /// Number of nodes currently stored.
    pub fn len(&self) -> usize {
        self.nodes.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.read().expect("lock poisoned").is_empty()
    }

    /// Number of successful `commit` calls.
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    /// Return a sorted list of all node IDs in the store.
    pub fn all_ids(&self) -> Vec<ContentId> {
        let map = self.nodes.read().expect("lock poisoned");
        let mut ids: Vec<ContentId> = map.keys().copied().collect();
        ids.sort();
        ids
    }
}

impl Default for InMemoryNodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore for InMemoryNodeStore {
    fn default_prefix(&self) -> Prefix {
        self.default_prefix
    }

    fn put(&self, node: &Node) -> StoreResult<ContentId> {
        let id = node.cid()?;
        let mut map = self.nodes.write().expect("lock poisoned");
        map.entry(id).or_insert_with(|| node.clone());
        Ok(id)
    }

    fn get(&self, id: &ContentId) -> StoreResult<Option<Node>> {
        let map = self.nodes.read().expect("lock poisoned");
        Ok(map.get(id).cloned())
    }

    fn has(&self, id: &ContentId) -> StoreResult<bool> {
        let map = self.nodes.read().expect("lock poisoned");
        Ok(map.contains_key(id))
    }

    fn commit(&self) -> StoreResult<()> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryNodeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryNodeStore")
            .field("node_count", &self.len())
            .field("default_prefix", &self.default_prefix)
            .finish()
    }
}
