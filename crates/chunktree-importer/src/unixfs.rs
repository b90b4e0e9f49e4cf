//! In-memory tree nodes as assembled by a [`DagBuilder`](crate::DagBuilder).
//!
//! These carry the file-level bookkeeping (type tag, per-child file sizes,
//! source position) that layout strategies need. [`to_node`](TreeNode::to_node)
//! lowers them to the physical [`Node`] handed to a store.

use bytes::Bytes;
use chunktree_store::{DataType, FsNode, Link, Node, PosInfo, StoreResult};
use chunktree_types::Prefix;

/// Anything that can carry source position metadata.
pub trait Positioned {
    fn pos_info(&self) -> Option<&PosInfo>;
    fn set_pos_info(&mut self, pos_info: Option<PosInfo>);
}

// ---------------------------------------------------------------------------
// Leaves
// ---------------------------------------------------------------------------

/// Leaf data wrapped in a file envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrappedLeaf {
    ufmt: FsNode,
    prefix: Prefix,
    pos_info: Option<PosInfo>,
}

impl WrappedLeaf {
    pub(crate) fn new(ufmt: FsNode, prefix: Prefix) -> Self {
        Self {
            ufmt,
            prefix,
            pos_info: None,
        }
    }

    pub fn envelope(&self) -> &FsNode {
        &self.ufmt
    }
}

/// A tree leaf, either a bare raw block or a wrapped chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LeafNode {
    Raw(Node),
    Wrapped(WrappedLeaf),
}

impl LeafNode {
    /// File bytes carried by this leaf.
    pub fn payload(&self) -> &Bytes {
        match self {
            Self::Raw(node) => node.data(),
            Self::Wrapped(leaf) => leaf.ufmt.data(),
        }
    }

    pub fn file_size(&self) -> u64 {
        match self {
            Self::Raw(node) => node.data().len() as u64,
            Self::Wrapped(leaf) => leaf.ufmt.file_size(),
        }
    }

    /// Envelope type tag; `None` for raw leaves.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Self::Raw(_) => None,
            Self::Wrapped(leaf) => Some(leaf.ufmt.data_type()),
        }
    }

    pub fn to_node(&self) -> StoreResult<Node> {
        match self {
            Self::Raw(node) => Ok(node.clone()),
            Self::Wrapped(leaf) => {
                let mut node = Node::proto(Vec::new(), leaf.ufmt.encode()?, leaf.prefix);
                node.set_pos_info(leaf.pos_info.clone());
                Ok(node)
            }
        }
    }
}

impl Positioned for LeafNode {
    fn pos_info(&self) -> Option<&PosInfo> {
        match self {
            Self::Raw(node) => node.pos_info(),
            Self::Wrapped(leaf) => leaf.pos_info.as_ref(),
        }
    }

    fn set_pos_info(&mut self, pos_info: Option<PosInfo>) {
        match self {
            Self::Raw(node) => node.set_pos_info(pos_info),
            Self::Wrapped(leaf) => leaf.pos_info = pos_info,
        }
    }
}

// ---------------------------------------------------------------------------
// Internal nodes
// ---------------------------------------------------------------------------

/// A file node whose data lives in its children.
///
/// Children stay in the order they were appended; that order is the byte
/// order of the file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InternalNode {
    ufmt: FsNode,
    links: Vec<Link>,
    prefix: Prefix,
    pos_info: Option<PosInfo>,
}

impl InternalNode {
    pub(crate) fn new(prefix: Prefix) -> Self {
        Self {
            ufmt: FsNode::new(DataType::File),
            links: Vec::new(),
            prefix,
            pos_info: None,
        }
    }

    pub fn num_children(&self) -> usize {
        self.links.len()
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Sum of the file bytes under every child.
    pub fn file_size(&self) -> u64 {
        self.ufmt.file_size()
    }

    pub fn envelope(&self) -> &FsNode {
        &self.ufmt
    }

    pub(crate) fn push_child(&mut self, link: Link, file_size: u64) {
        self.links.push(link);
        self.ufmt.add_block_size(file_size);
    }

    pub fn to_node(&self) -> StoreResult<Node> {
        let mut node = Node::proto(self.links.clone(), self.ufmt.encode()?, self.prefix);
        node.set_pos_info(self.pos_info.clone());
        Ok(node)
    }
}

impl Positioned for InternalNode {
    fn pos_info(&self) -> Option<&PosInfo> {
        self.pos_info.as_ref()
    }

    fn set_pos_info(&mut self, pos_info: Option<PosInfo>) {
        self.pos_info = pos_info;
    }
}

// ---------------------------------------------------------------------------
// TreeNode
// ---------------------------------------------------------------------------

/// Any node a builder can append as a child.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeNode {
    Leaf(LeafNode),
    Internal(InternalNode),
}

impl TreeNode {
    pub fn file_size(&self) -> u64 {
        match self {
            Self::Leaf(leaf) => leaf.file_size(),
            Self::Internal(node) => node.file_size(),
        }
    }

    pub fn to_node(&self) -> StoreResult<Node> {
        match self {
            Self::Leaf(leaf) => leaf.to_node(),
            Self::Internal(node) => node.to_node(),
        }
    }
}

impl Positioned for TreeNode {
    fn pos_info(&self) -> Option<&PosInfo> {
        match self {
            Self::Leaf(leaf) => leaf.pos_info(),
            Self::Internal(node) => node.pos_info(),
        }
    }

    fn set_pos_info(&mut self, pos_info: Option<PosInfo>) {
        match self {
            Self::Leaf(leaf) => leaf.set_pos_info(pos_info),
            Self::Internal(node) => node.set_pos_info(pos_info),
        }
    }
}

impl From<LeafNode> for TreeNode {
    fn from(leaf: LeafNode) -> Self {
        Self::Leaf(leaf)
    }
}

impl From<InternalNode> for TreeNode {
    fn from(node: InternalNode) -> Self {
        Self::Internal(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chunktree_types::Codec;

    fn wrapped(data: &'static [u8]) -> LeafNode {
        let mut ufmt = FsNode::new(DataType::Raw);
        ufmt.set_data(Bytes::from_static(data));
        LeafNode::Wrapped(WrappedLeaf::new(ufmt, Prefix::v0()))
    }

    #[test]
    fn wrapped_leaf_lowers_to_linkless_proto() {
        let leaf = wrapped(b"chunk");
        let node = leaf.to_node().unwrap();
        assert_eq!(node.prefix().codec, Codec::DagPb);
        assert!(node.links().is_empty());
        let ufmt = FsNode::decode(node.data()).unwrap();
        assert_eq!(ufmt.data_type(), DataType::Raw);
        assert_eq!(ufmt.data().as_ref(), b"chunk");
        assert_eq!(leaf.file_size(), 5);
        assert_eq!(leaf.payload().as_ref(), b"chunk");
    }

    #[test]
    fn raw_leaf_has_no_type_tag() {
        let leaf = LeafNode::Raw(Node::raw(Bytes::from_static(b"abc"), Prefix::v0()));
        assert_eq!(leaf.data_type(), None);
        assert_eq!(leaf.file_size(), 3);
        assert!(leaf.to_node().unwrap().is_raw());
    }

    #[test]
    fn internal_node_tracks_children() {
        let a = wrapped(b"aaaa").to_node().unwrap();
        let b = wrapped(b"bb").to_node().unwrap();
        let mut parent = InternalNode::new(Prefix::v0());
        parent.push_child(Link::to_node(&a).unwrap(), 4);
        parent.push_child(Link::to_node(&b).unwrap(), 2);

        assert_eq!(parent.num_children(), 2);
        assert_eq!(parent.file_size(), 6);
        assert_eq!(parent.envelope().block_sizes(), &[4, 2]);

        let node = parent.to_node().unwrap();
        assert_eq!(node.links().len(), 2);
        assert_eq!(node.links()[0].cid, a.cid().unwrap());
        let ufmt = FsNode::decode(node.data()).unwrap();
        assert_eq!(ufmt.data_type(), DataType::File);
        assert_eq!(ufmt.file_size(), 6);
    }

    #[test]
    fn pos_info_carried_to_node_without_changing_cid() {
        let mut leaf = wrapped(b"x");
        let before = leaf.to_node().unwrap().cid().unwrap();
        leaf.set_pos_info(Some(PosInfo {
            offset: 7,
            full_path: "/data/file".into(),
            stat: chunktree_store::FileStat {
                size: 8,
                modified: None,
                readonly: true,
            },
        }));
        let node = leaf.to_node().unwrap();
        assert_eq!(node.pos_info().unwrap().offset, 7);
        assert_eq!(node.cid().unwrap(), before);
    }

    #[test]
    fn tree_node_conversions() {
        let leaf: TreeNode = wrapped(b"abc").into();
        assert_eq!(leaf.file_size(), 3);
        let internal: TreeNode = InternalNode::new(Prefix::v0()).into();
        assert_eq!(internal.file_size(), 0);
        assert!(internal.pos_info().is_none());
    }
}
