use std::fmt;
use std::io::Read;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ChunkError, ChunkResult};
use crate::source::ChunkSource;
use crate::splitter::{SizeSplitter, DEFAULT_CHUNK_SIZE};

/// Chunker selection as written in configuration.
///
/// Accepted forms: `"default"` and `"size-<bytes>"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ChunkerSpec {
    /// Fixed-size chunks of the given byte length.
    Size(usize),
}

impl ChunkerSpec {
    /// Largest chunk this spec can produce.
    pub fn max_chunk_size(&self) -> usize {
        match self {
            Self::Size(size) => *size,
        }
    }

    /// Build a chunk source over `reader`.
    pub fn build<'a, R: Read + 'a>(&self, reader: R) -> ChunkResult<Box<dyn ChunkSource + 'a>> {
        match self {
            Self::Size(size) => Ok(Box::new(SizeSplitter::new(reader, *size)?)),
        }
    }
}

impl Default for ChunkerSpec {
    fn default() -> Self {
        Self::Size(DEFAULT_CHUNK_SIZE)
    }
}

impl FromStr for ChunkerSpec {
    type Err = ChunkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ChunkError::InvalidSpec {
            spec: s.to_string(),
            reason: reason.to_string(),
        };

        if s == "default" {
            return Ok(Self::default());
        }
        match s.split_once('-') {
            Some(("size", n)) => {
                let size: usize = n.parse().map_err(|_| invalid("size is not a number"))?;
                if size == 0 {
                    return Err(invalid("size must be non-zero"));
                }
                Ok(Self::Size(size))
            }
            _ => Err(invalid("unknown chunker")),
        }
    }
}

impl fmt::Display for ChunkerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Size(size) => write!(f, "size-{size}"),
        }
    }
}

impl TryFrom<String> for ChunkerSpec {
    type Error = ChunkError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ChunkerSpec> for String {
    fn from(spec: ChunkerSpec) -> Self {
        spec.to_string()
    }
}
