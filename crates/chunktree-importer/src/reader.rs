use chunktree_store::{DataType, FsNode, Node, NodeStore};
use chunktree_types::ContentId;
use tracing::debug;

use crate::error::{ImportError, ImportResult};

/// Reassembles file bytes from a tree in a [`NodeStore`].
#[derive(Debug)]
pub struct DagReader<'a, S: NodeStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: NodeStore + ?Sized> DagReader<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Read the whole file rooted at `root`.
    pub fn read_all(&self, root: &ContentId) -> ImportResult<Vec<u8>> {
        let mut out = Vec::new();
        self.read_into(root, &mut out)?;
        debug!(root = %root.short_hex(), bytes = out.len(), "read tree");
        Ok(out)
    }

    /// Append the bytes of the subtree at `id` to `out`, returning how many
    /// were written.
    ///
    /// Each child must contribute exactly the size its parent declares.
    pub fn read_into(&self, id: &ContentId, out: &mut Vec<u8>) -> ImportResult<u64> {
        let node = self.load(id)?;
        if node.is_raw() {
            out.extend_from_slice(node.data());
            return Ok(node.data().len() as u64);
        }

        let ufmt = FsNode::decode(node.data())?;
        match ufmt.data_type() {
            DataType::Raw | DataType::File => {}
            other => {
                return Err(ImportError::UnexpectedNode {
                    id: *id,
                    reason: format!("{other} node in a file tree"),
                })
            }
        }
        if node.links().len() != ufmt.num_children() {
            return Err(ImportError::UnexpectedNode {
                id: *id,
                reason: format!(
                    "{} links but {} block sizes",
                    node.links().len(),
                    ufmt.num_children()
                ),
            });
        }

        out.extend_from_slice(ufmt.data());
        let mut written = ufmt.data().len() as u64;
        for (link, &expected) in node.links().iter().zip(ufmt.block_sizes()) {
            let got = self.read_into(&link.cid, out)?;
            if got != expected {
                return Err(ImportError::UnexpectedNode {
                    id: link.cid,
                    reason: format!("holds {got} bytes, parent declares {expected}"),
                });
            }
            written += got;
        }
        Ok(written)
    }

    fn load(&self, id: &ContentId) -> ImportResult<Node> {
        self.store.get(id)?.ok_or(ImportError::NotFound(*id))
    }
}
