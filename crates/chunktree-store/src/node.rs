use std::fs::Metadata;
use std::path::PathBuf;
use std::time::SystemTime;

use bytes::Bytes;
use chunktree_crypto::ContentHasher;
use chunktree_types::{Codec, ContentId, Prefix};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

// ---------------------------------------------------------------------------
// Link
// ---------------------------------------------------------------------------

/// A reference from a linked node to one of its children.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Link name. Empty for file chunks.
    pub name: String,
    /// Identifier of the child block.
    pub cid: ContentId,
    /// Cumulative encoded size of the subtree rooted at the child.
    pub size: u64,
}

impl Link {
    pub fn new(cid: ContentId, size: u64) -> Self {
        Self {
            name: String::new(),
            cid,
            size,
        }
    }

    /// Link to `node`, using its identifier and cumulative size.
    pub fn to_node(node: &Node) -> StoreResult<Self> {
        Ok(Self::new(node.cid()?, node.size()?))
    }
}

// ---------------------------------------------------------------------------
// PosInfo
// ---------------------------------------------------------------------------

/// Snapshot of the file metadata taken when an import starts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStat {
    pub size: u64,
    pub modified: Option<SystemTime>,
    pub readonly: bool,
}

impl FileStat {
    pub fn from_metadata(meta: &Metadata) -> Self {
        Self {
            size: meta.len(),
            modified: meta.modified().ok(),
            readonly: meta.permissions().readonly(),
        }
    }

    /// Stat `path` now.
    pub fn of(path: &std::path::Path) -> std::io::Result<Self> {
        Ok(Self::from_metadata(&std::fs::metadata(path)?))
    }
}

/// Where a node's bytes live in the original source file.
///
/// Advisory only: position info never takes part in encoding or hashing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosInfo {
    pub offset: u64,
    pub full_path: PathBuf,
    pub stat: FileStat,
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// Physical block variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeBody {
    /// Unwrapped bytes.
    Raw(Bytes),
    /// Ordered links plus an opaque data payload.
    Proto { links: Vec<Link>, data: Bytes },
}

/// A block as handed to a [`NodeStore`](crate::NodeStore).
///
/// The codec of `prefix` always agrees with the body: raw bodies carry the
/// raw codec, linked bodies carry dag-pb.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    body: NodeBody,
    prefix: Prefix,
    pos_info: Option<PosInfo>,
}

#[derive(Serialize)]
struct ProtoBlockRef<'a> {
    links: &'a [Link],
    data: &'a [u8],
}

#[derive(Deserialize)]
struct ProtoBlock {
    links: Vec<Link>,
    data: Vec<u8>,
}

impl Node {
    /// A raw block. The prefix is switched to the raw codec.
    pub fn raw(data: Bytes, prefix: Prefix) -> Self {
        Self {
            body: NodeBody::Raw(data),
            prefix: prefix.with_codec(Codec::Raw),
            pos_info: None,
        }
    }

    /// A linked block. The prefix is switched to dag-pb.
    pub fn proto(links: Vec<Link>, data: Bytes, prefix: Prefix) -> Self {
        Self {
            body: NodeBody::Proto { links, data },
            prefix: prefix.with_codec(Codec::DagPb),
            pos_info: None,
        }
    }

    pub fn body(&self) -> &NodeBody {
        &self.body
    }

    pub fn prefix(&self) -> Prefix {
        self.prefix
    }

    pub fn is_raw(&self) -> bool {
        matches!(self.body, NodeBody::Raw(_))
    }

    /// Raw bytes, or the data payload of a linked block.
    pub fn data(&self) -> &Bytes {
        match &self.body {
            NodeBody::Raw(data) => data,
            NodeBody::Proto { data, .. } => data,
        }
    }

    pub fn links(&self) -> &[Link] {
        match &self.body {
            NodeBody::Raw(_) => &[],
            NodeBody::Proto { links, .. } => links,
        }
    }

    pub fn pos_info(&self) -> Option<&PosInfo> {
        self.pos_info.as_ref()
    }

    pub fn set_pos_info(&mut self, pos_info: Option<PosInfo>) {
        self.pos_info = pos_info;
    }

    pub fn with_pos_info(mut self, pos_info: PosInfo) -> Self {
        self.pos_info = Some(pos_info);
        self
    }

    /// Encoded block bytes, the input to hashing.
    pub fn encode(&self) -> StoreResult<Bytes> {
        match &self.body {
            NodeBody::Raw(data) => Ok(data.clone()),
            NodeBody::Proto { links, data } => {
                let block = ProtoBlockRef { links, data };
                bincode::serialize(&block)
                    .map(Bytes::from)
                    .map_err(|e| StoreError::Serialization(e.to_string()))
            }
        }
    }

    /// Decode block bytes stored under `id`, verifying the digest.
    pub fn decode(id: &ContentId, bytes: Bytes) -> StoreResult<Self> {
        let prefix = id.prefix();
        let node = match prefix.codec {
            Codec::Raw => Self::raw(bytes, prefix),
            Codec::DagPb => {
                let block: ProtoBlock =
                    bincode::deserialize(&bytes).map_err(|e| StoreError::CorruptNode {
                        id: *id,
                        reason: e.to_string(),
                    })?;
                Self::proto(block.links, Bytes::from(block.data), prefix)
            }
        };
        let computed = node.cid()?;
        if computed != *id {
            return Err(StoreError::HashMismatch { id: *id, computed });
        }
        Ok(node)
    }

    /// Content identifier of the encoded block.
    pub fn cid(&self) -> StoreResult<ContentId> {
        Ok(self.encode_with_cid()?.1)
    }

    /// Encoded block bytes together with their identifier, encoding once.
    pub fn encode_with_cid(&self) -> StoreResult<(Bytes, ContentId)> {
        let bytes = self.encode()?;
        let id = ContentHasher::new(self.prefix).hash(&bytes);
        Ok((bytes, id))
    }

    /// Cumulative size: this block's encoded length plus every link's
    /// cumulative size.
    pub fn size(&self) -> StoreResult<u64> {
        let own = self.encode()?.len() as u64;
        Ok(own + self.links().iter().map(|l| l.size).sum::<u64>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chunktree_types::{CidVersion, HashFunction};

    fn leaf(content: &'static [u8]) -> Node {
        Node::raw(Bytes::from_static(content), Prefix::v0())
    }

    #[test]
    fn raw_node_upgrades_v0_prefix() {
        let node = leaf(b"abc");
        assert_eq!(node.prefix().codec, Codec::Raw);
        assert_eq!(node.prefix().version, CidVersion::V1);
        assert_eq!(node.cid().unwrap().prefix(), node.prefix());
    }

    #[test]
    fn raw_encoding_is_identity() {
        let node = leaf(b"payload");
        assert_eq!(&node.encode().unwrap()[..], b"payload");
        assert_eq!(node.size().unwrap(), 7);
    }

    #[test]
    fn proto_size_includes_links() {
        let a = leaf(b"aaaa");
        let b = leaf(b"bb");
        let links = vec![Link::to_node(&a).unwrap(), Link::to_node(&b).unwrap()];
        let parent = Node::proto(links, Bytes::new(), Prefix::v0());
        let own = parent.encode().unwrap().len() as u64;
        assert_eq!(parent.size().unwrap(), own + 6);
        assert_eq!(parent.cid().unwrap().version(), CidVersion::V0);
    }

    #[test]
    fn decode_roundtrip_proto() {
        let child = leaf(b"child");
        let parent = Node::proto(
            vec![Link::to_node(&child).unwrap()],
            Bytes::from_static(b"meta"),
            Prefix::v1(Codec::DagPb, HashFunction::Blake3),
        );
        let id = parent.cid().unwrap();
        let decoded = Node::decode(&id, parent.encode().unwrap()).unwrap();
        assert_eq!(decoded, parent);
    }

    #[test]
    fn decode_detects_tampering() {
        let node = leaf(b"original");
        let id = node.cid().unwrap();
        let err = Node::decode(&id, Bytes::from_static(b"tampered")).unwrap_err();
        assert!(matches!(err, StoreError::HashMismatch { .. }));
    }

    #[test]
    fn pos_info_does_not_affect_cid() {
        let plain = leaf(b"positioned");
        let positioned = plain.clone().with_pos_info(PosInfo {
            offset: 42,
            full_path: PathBuf::from("/tmp/file"),
            stat: FileStat {
                size: 100,
                modified: None,
                readonly: false,
            },
        });
        assert_eq!(plain.cid().unwrap(), positioned.cid().unwrap());
        assert_eq!(positioned.pos_info().unwrap().offset, 42);
    }

    #[test]
    fn encode_with_cid_matches_separate_calls() {
        let child = leaf(b"child");
        let parent = Node::proto(
            vec![Link::to_node(&child).unwrap()],
            Bytes::from_static(b"meta"),
            Prefix::v0(),
        );
        let (bytes, id) = parent.encode_with_cid().unwrap();
        assert_eq!(bytes, parent.encode().unwrap());
        assert_eq!(id, parent.cid().unwrap());
        assert_eq!(Node::decode(&id, bytes).unwrap(), parent);
    }

    #[test]
    fn link_order_changes_cid() {
        let a = Link::to_node(&leaf(b"a")).unwrap();
        let b = Link::to_node(&leaf(b"b")).unwrap();
        let ab = Node::proto(vec![a.clone(), b.clone()], Bytes::new(), Prefix::v0());
        let ba = Node::proto(vec![b, a], Bytes::new(), Prefix::v0());
        assert_ne!(ab.cid().unwrap(), ba.cid().unwrap());
    }
}
