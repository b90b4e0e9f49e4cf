use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use bytes::Bytes;
use chunktree_types::{ContentId, Prefix};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::node::{FileStat, Node, PosInfo};
use crate::traits::NodeStore;

/// On-disk reference written instead of block bytes for no-copy raw leaves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct FileRef {
    full_path: PathBuf,
    offset: u64,
    size: u64,
    stat: FileStat,
}

/// Directory-backed node store.
///
/// Layout:
/// ```text
/// <root>/blocks/<cid-hex>.blk   encoded block bytes
/// <root>/blocks/<cid-hex>.ref   JSON reference into a source file (no-copy)
/// ```
///
/// Every file is written to a temp file in the same directory and renamed
/// into place, so readers never observe a partial block. `put` does not
/// fsync; `commit` syncs every file written since the previous commit and
/// then the directory itself.
///
/// Raw nodes carrying [`PosInfo`] are stored as references: the bytes stay
/// in the source file and are read back (and re-verified) on `get`.
pub struct FsNodeStore {
    blocks_dir: PathBuf,
    default_prefix: Prefix,
    unsynced: Mutex<Vec<PathBuf>>,
}

impl FsNodeStore {
    /// Open (or create) a store rooted at `root`.
    pub fn open(root: &Path) -> StoreResult<Self> {
        Self::open_with_prefix(root, Prefix::v0())
    }

    pub fn open_with_prefix(root: &Path, default_prefix: Prefix) -> StoreResult<Self> {
        let blocks_dir = root.join("blocks");
        fs::create_dir_all(&blocks_dir)?;
        Ok(Self {
            blocks_dir,
            default_prefix,
            unsynced: Mutex::new(Vec::new()),
        })
    }

    fn block_path(&self, id: &ContentId) -> PathBuf {
        self.blocks_dir.join(format!("{}.blk", id.to_hex()))
    }

    fn ref_path(&self, id: &ContentId) -> PathBuf {
        self.blocks_dir.join(format!("{}.ref", id.to_hex()))
    }

    /// Number of files written but not yet made durable.
    pub fn unsynced_count(&self) -> usize {
        self.unsynced.lock().expect("lock poisoned").len()
    }

    fn write_atomic(&self, path: &Path, contents: &[u8]) -> StoreResult<()> {
        let mut tmp = NamedTempFile::new_in(&self.blocks_dir)?;
        tmp.write_all(contents)?;
        tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
        self.unsynced
            .lock()
            .expect("lock poisoned")
            .push(path.to_path_buf());
        Ok(())
    }

    fn read_reference(&self, id: &ContentId, path: &Path) -> StoreResult<Node> {
        let file_ref: FileRef = serde_json::from_slice(&fs::read(path)?)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let current = FileStat::of(&file_ref.full_path)?;
        if current.size != file_ref.stat.size || current.modified != file_ref.stat.modified {
            return Err(StoreError::StaleReference {
                path: file_ref.full_path.display().to_string(),
            });
        }

        let mut file = File::open(&file_ref.full_path)?;
        file.seek(SeekFrom::Start(file_ref.offset))?;
        let mut buf = vec![0u8; file_ref.size as usize];
        file.read_exact(&mut buf)?;

        let node = Node::decode(id, Bytes::from(buf))?;
        Ok(node.with_pos_info(PosInfo {
            offset: file_ref.offset,
            full_path: file_ref.full_path,
            stat: file_ref.stat,
        }))
    }
}

impl NodeStore for FsNodeStore {
    fn default_prefix(&self) -> Prefix {
        self.default_prefix
    }

    fn put(&self, node: &Node) -> StoreResult<ContentId> {
        let id = node.cid()?;
        if self.has(&id)? {
            return Ok(id);
        }

        match node.pos_info() {
            Some(pos) if node.is_raw() => {
                let file_ref = FileRef {
                    full_path: pos.full_path.clone(),
                    offset: pos.offset,
                    size: node.data().len() as u64,
                    stat: pos.stat.clone(),
                };
                let json = serde_json::to_vec(&file_ref)
                    .map_err(|e| StoreError::Serialization(e.to_string()))?;
                self.write_atomic(&self.ref_path(&id), &json)?;
                debug!(id = %id.short_hex(), offset = pos.offset, "stored file reference");
            }
            _ => {
                self.write_atomic(&self.block_path(&id), &node.encode()?)?;
            }
        }
        Ok(id)
    }

    fn get(&self, id: &ContentId) -> StoreResult<Option<Node>> {
        let block = self.block_path(id);
        if block.exists() {
            let bytes = fs::read(&block)?;
            return Node::decode(id, Bytes::from(bytes)).map(Some);
        }
        let reference = self.ref_path(id);
        if reference.exists() {
            return self.read_reference(id, &reference).map(Some);
        }
        Ok(None)
    }

    fn has(&self, id: &ContentId) -> StoreResult<bool> {
        Ok(self.block_path(id).exists() || self.ref_path(id).exists())
    }

    fn commit(&self) -> StoreResult<()> {
        let mut unsynced = self.unsynced.lock().expect("lock poisoned");
        if unsynced.is_empty() {
            return Ok(());
        }
        for path in unsynced.iter() {
            File::open(path)?.sync_all()?;
        }
        File::open(&self.blocks_dir)?.sync_all()?;
        debug!(files = unsynced.len(), "store commit synced");
        unsynced.clear();
        Ok(())
    }
}

impl std::fmt::Debug for FsNodeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsNodeStore")
            .field("blocks_dir", &self.blocks_dir)
            .field("default_prefix", &self.default_prefix)
            .finish()
    }
}
