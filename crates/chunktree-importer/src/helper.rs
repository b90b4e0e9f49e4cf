use bytes::Bytes;
use chunktree_chunker::ChunkSource;
use chunktree_store::{Batch, DataType, FsNode, Link, Node, NodeStore, PosInfo};
use chunktree_types::Prefix;
use tracing::{debug, trace};

use crate::config::{BuilderParams, NoCopy};
use crate::error::{ImportError, ImportResult};
use crate::lookahead::Lookahead;
use crate::unixfs::{InternalNode, LeafNode, Positioned, TreeNode, WrappedLeaf};

/// Primitives for turning one chunk stream into a tree of nodes.
///
/// A layout strategy drives the builder: it creates internal nodes with
/// [`new_internal`](Self::new_internal), fills them with
/// [`fill_node_layer`](Self::fill_node_layer), nests them with
/// [`add_child`](Self::add_child), writes the root with [`add`](Self::add)
/// and finishes with [`commit`](Self::commit). Every node uses the same
/// prefix, and a builder serves exactly one stream.
pub struct DagBuilder<'a, S: NodeStore + ?Sized, C> {
    source: Lookahead<C>,
    batch: Batch<'a, S>,
    raw_leaves: bool,
    max_links: usize,
    block_size_limit: usize,
    prefix: Prefix,
    no_copy: Option<NoCopy>,
    /// Bytes handed out by the source so far.
    offset: u64,
}

impl<'a, S: NodeStore + ?Sized, C: ChunkSource> DagBuilder<'a, S, C> {
    pub fn new(params: BuilderParams, store: &'a S, source: C) -> ImportResult<Self> {
        params.validate()?;
        let prefix = params.prefix.unwrap_or_else(|| store.default_prefix());
        debug!(
            prefix = %prefix,
            max_links = params.max_links,
            raw_leaves = params.raw_leaves,
            no_copy = params.no_copy.is_some(),
            "dag builder created"
        );
        Ok(Self {
            source: Lookahead::new(source),
            batch: Batch::with_config(store, params.batch),
            raw_leaves: params.raw_leaves,
            max_links: params.max_links,
            block_size_limit: params.block_size_limit,
            prefix,
            no_copy: params.no_copy,
            offset: 0,
        })
    }

    /// Whether the input stream has been fully consumed.
    pub fn done(&mut self) -> bool {
        self.source.is_exhausted()
    }

    /// The next chunk of input, or `None` once the stream is over.
    pub fn next_chunk(&mut self) -> ImportResult<Option<Bytes>> {
        let chunk = self.source.take_next()?;
        if let Some(chunk) = &chunk {
            self.offset += chunk.len() as u64;
        }
        Ok(chunk)
    }

    /// Build a leaf holding `data`.
    ///
    /// With raw leaves the result is a bare raw block. Otherwise the data is
    /// wrapped: `Some` gives a `Raw`-tagged chunk (even when empty) while
    /// `None` gives an empty `File` node, which is what older importers
    /// wrote for an empty file.
    pub fn new_leaf(&self, data: Option<Bytes>) -> ImportResult<LeafNode> {
        let len = data.as_ref().map_or(0, Bytes::len);
        if len > self.block_size_limit {
            return Err(ImportError::SizeLimitExceeded {
                size: len,
                limit: self.block_size_limit,
            });
        }
        trace!(len, raw = self.raw_leaves, "new leaf");

        if self.raw_leaves {
            return Ok(LeafNode::Raw(Node::raw(data.unwrap_or_default(), self.prefix)));
        }
        let ufmt = match data {
            None => FsNode::new(DataType::File),
            Some(data) => {
                let mut ufmt = FsNode::new(DataType::Raw);
                ufmt.set_data(data);
                ufmt
            }
        };
        Ok(LeafNode::Wrapped(WrappedLeaf::new(ufmt, self.prefix)))
    }

    /// An empty file node, ready to receive children.
    pub fn new_internal(&self) -> InternalNode {
        InternalNode::new(self.prefix)
    }

    /// Append leaves to `node` until it holds `max_links` children or the
    /// input runs out.
    ///
    /// On error the children appended so far stay in place.
    pub fn fill_node_layer(&mut self, node: &mut InternalNode) -> ImportResult<()> {
        let start = node.num_children();
        while node.num_children() < self.max_links && !self.done() {
            let Some(child) = self.next_data_node()? else {
                break;
            };
            self.add_child(node, child)?;
        }
        debug!(
            added = node.num_children() - start,
            children = node.num_children(),
            file_size = node.file_size(),
            "filled node layer"
        );
        Ok(())
    }

    /// Build a leaf from the next chunk, or `None` at end of input.
    ///
    /// In no-copy mode the leaf records where its bytes start in the source
    /// file.
    pub fn next_data_node(&mut self) -> ImportResult<Option<LeafNode>> {
        let offset = self.offset;
        let Some(chunk) = self.next_chunk()? else {
            return Ok(None);
        };
        let mut leaf = self.new_leaf(Some(chunk))?;
        self.set_pos_info(&mut leaf, offset);
        Ok(Some(leaf))
    }

    /// Stage `child` for writing and link it as the last child of `parent`.
    pub fn add_child(
        &mut self,
        parent: &mut InternalNode,
        child: impl Into<TreeNode>,
    ) -> ImportResult<()> {
        let child = child.into();
        let file_size = child.file_size();
        let node = child.to_node()?;
        let size = node.size()?;
        let cid = self.batch.stage(node)?;
        parent.push_child(Link::new(cid, size), file_size);
        Ok(())
    }

    /// Record `offset` into the source file on `node` in no-copy mode.
    pub fn set_pos_info<N: Positioned + ?Sized>(&self, node: &mut N, offset: u64) {
        if let Some(no_copy) = &self.no_copy {
            node.set_pos_info(Some(PosInfo {
                offset,
                full_path: no_copy.full_path.clone(),
                stat: no_copy.stat.clone(),
            }));
        }
    }

    /// Write `node` straight to the store and return the stored block.
    ///
    /// Used for the root, which has no parent to be staged through. The node
    /// becomes durable with the next [`commit`](Self::commit).
    pub fn add(&mut self, node: impl Into<TreeNode>) -> ImportResult<Node> {
        let node = node.into().to_node()?;
        let id = self.batch.put_now(&node)?;
        debug!(id = %id.short_hex(), "added node");
        Ok(node)
    }

    pub fn max_links(&self) -> usize {
        self.max_links
    }

    pub fn prefix(&self) -> Prefix {
        self.prefix
    }

    /// Number of input bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Write every staged node and make the tree durable.
    ///
    /// Must succeed before the build counts as finished.
    pub fn commit(&mut self) -> ImportResult<()> {
        self.batch.commit()?;
        Ok(())
    }
}
