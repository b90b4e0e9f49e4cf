//! File-format envelope carried in the data payload of linked blocks.
//!
//! The envelope tags what a block represents (a chunk of raw data, a file
//! root, a directory, ...) and records its declared byte length along with
//! the byte length each child contributes.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Type tag of a file-format envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// A chunk of file data.
    Raw,
    Directory,
    /// A file, or an internal node of a file's chunk tree.
    File,
    Metadata,
    Symlink,
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Raw => write!(f, "raw"),
            Self::Directory => write!(f, "directory"),
            Self::File => write!(f, "file"),
            Self::Metadata => write!(f, "metadata"),
            Self::Symlink => write!(f, "symlink"),
        }
    }
}

/// Decoded file-format envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FsNode {
    data_type: DataType,
    data: Bytes,
    blocksizes: Vec<u64>,
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    data_type: DataType,
    data: Vec<u8>,
    filesize: Option<u64>,
    blocksizes: Vec<u64>,
}

impl FsNode {
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            data: Bytes::new(),
            blocksizes: Vec::new(),
        }
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn set_data(&mut self, data: Bytes) {
        self.data = data;
    }

    /// Record that a child contributes `size` bytes of file data.
    pub fn add_block_size(&mut self, size: u64) {
        self.blocksizes.push(size);
    }

    pub fn block_sizes(&self) -> &[u64] {
        &self.blocksizes
    }

    pub fn num_children(&self) -> usize {
        self.blocksizes.len()
    }

    /// Declared byte length: inline data plus every child's contribution.
    pub fn file_size(&self) -> u64 {
        self.data.len() as u64 + self.blocksizes.iter().sum::<u64>()
    }

    pub fn encode(&self) -> StoreResult<Bytes> {
        let filesize = match self.data_type {
            DataType::Raw | DataType::File => Some(self.file_size()),
            _ => None,
        };
        let envelope = Envelope {
            data_type: self.data_type,
            data: self.data.to_vec(),
            filesize,
            blocksizes: self.blocksizes.clone(),
        };
        bincode::serialize(&envelope)
            .map(Bytes::from)
            .map_err(|e| StoreError::Serialization(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> StoreResult<Self> {
        let envelope: Envelope =
            bincode::deserialize(bytes).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let node = Self {
            data_type: envelope.data_type,
            data: Bytes::from(envelope.data),
            blocksizes: envelope.blocksizes,
        };
        if let Some(declared) = envelope.filesize {
            if declared != node.file_size() {
                return Err(StoreError::Serialization(format!(
                    "declared file size {declared} does not match contents ({})",
                    node.file_size()
                )));
            }
        }
        Ok(node)
    }
}
