use std::path::{Path, PathBuf};

use chunktree_chunker::ChunkerSpec;
use chunktree_store::{BatchConfig, FileStat};
use chunktree_types::{CidVersion, Codec, HashFunction, Prefix};
use serde::{Deserialize, Serialize};

use crate::error::{ImportError, ImportResult};

/// Default maximum number of links per internal node.
pub const DEFAULT_MAX_LINKS: usize = 174;

/// Default upper bound on a single block's payload: 1 MiB.
pub const DEFAULT_BLOCK_SIZE_LIMIT: usize = 1024 * 1024;

/// Importer settings as written in a configuration file.
///
/// ```toml
/// max_links = 174
/// raw_leaves = true
/// cid_version = "v1"
/// hash = "blake3"
/// chunker = "size-262144"
///
/// [batch]
/// max_pending_nodes = 128
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImporterConfig {
    /// Maximum number of children per internal node.
    pub max_links: usize,
    /// Store leaves as unwrapped raw blocks.
    pub raw_leaves: bool,
    /// Identifier version. Unset means the store's default prefix, unless
    /// `hash` is set, which implies v1.
    pub cid_version: Option<CidVersion>,
    /// Hash function. Unset means sha2-256.
    pub hash: Option<HashFunction>,
    /// Largest chunk accepted as a leaf.
    pub block_size_limit: usize,
    /// How the input stream is cut into chunks.
    pub chunker: ChunkerSpec,
    pub batch: BatchConfig,
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            max_links: DEFAULT_MAX_LINKS,
            raw_leaves: false,
            cid_version: None,
            hash: None,
            block_size_limit: DEFAULT_BLOCK_SIZE_LIMIT,
            chunker: ChunkerSpec::default(),
            batch: BatchConfig::default(),
        }
    }
}

impl ImporterConfig {
    /// Parse and validate a TOML document. Missing keys take defaults.
    pub fn from_toml_str(s: &str) -> ImportResult<Self> {
        let config: Self =
            toml::from_str(s).map_err(|e| ImportError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a TOML file.
    pub fn load(path: &Path) -> ImportResult<Self> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> ImportResult<()> {
        if self.max_links == 0 {
            return Err(ImportError::InvalidConfig("max_links must be at least 1".into()));
        }
        if self.block_size_limit == 0 {
            return Err(ImportError::InvalidConfig(
                "block_size_limit must be non-zero".into(),
            ));
        }
        if self.chunker.max_chunk_size() > self.block_size_limit {
            return Err(ImportError::InvalidConfig(format!(
                "chunker {} produces chunks above the {} byte block size limit",
                self.chunker, self.block_size_limit
            )));
        }
        self.prefix()?;
        Ok(())
    }

    /// The configured addressing prefix, or `None` to use the store's.
    pub fn prefix(&self) -> ImportResult<Option<Prefix>> {
        let version = match (self.cid_version, self.hash) {
            (None, None) => return Ok(None),
            (None, Some(_)) => CidVersion::V1,
            (Some(version), _) => version,
        };
        let hash = self.hash.unwrap_or(HashFunction::Sha2_256);
        Ok(Some(Prefix::new(version, Codec::DagPb, hash)?))
    }

    /// Runtime parameters for a builder, without no-copy tracking.
    pub fn params(&self) -> ImportResult<BuilderParams> {
        self.validate()?;
        Ok(BuilderParams {
            max_links: self.max_links,
            raw_leaves: self.raw_leaves,
            prefix: self.prefix()?,
            block_size_limit: self.block_size_limit,
            batch: self.batch.clone(),
            no_copy: None,
        })
    }
}

/// Source file identity recorded on nodes in no-copy mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoCopy {
    pub full_path: PathBuf,
    pub stat: FileStat,
}

impl NoCopy {
    pub fn new(full_path: PathBuf, stat: FileStat) -> Self {
        Self { full_path, stat }
    }

    /// Resolve `path` to an absolute path and snapshot its metadata.
    pub fn for_file(path: &Path) -> ImportResult<Self> {
        let full_path = std::fs::canonicalize(path)?;
        let stat = FileStat::of(&full_path)?;
        Ok(Self { full_path, stat })
    }
}

/// Parameters for one [`DagBuilder`](crate::DagBuilder).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuilderParams {
    /// Maximum number of links per internal node.
    pub max_links: usize,
    /// Use raw blocks as leaves instead of wrapped raw-data envelopes.
    pub raw_leaves: bool,
    /// Prefix for every node; `None` takes the store's default.
    pub prefix: Option<Prefix>,
    pub block_size_limit: usize,
    pub batch: BatchConfig,
    /// Record source positions on nodes.
    pub no_copy: Option<NoCopy>,
}

impl Default for BuilderParams {
    fn default() -> Self {
        Self {
            max_links: DEFAULT_MAX_LINKS,
            raw_leaves: false,
            prefix: None,
            block_size_limit: DEFAULT_BLOCK_SIZE_LIMIT,
            batch: BatchConfig::default(),
            no_copy: None,
        }
    }
}

impl BuilderParams {
    pub fn with_max_links(mut self, max_links: usize) -> Self {
        self.max_links = max_links;
        self
    }

    pub fn with_raw_leaves(mut self, raw_leaves: bool) -> Self {
        self.raw_leaves = raw_leaves;
        self
    }

    pub fn with_prefix(mut self, prefix: Prefix) -> Self {
        self.prefix = Some(prefix);
        self
    }

    pub fn with_block_size_limit(mut self, limit: usize) -> Self {
        self.block_size_limit = limit;
        self
    }

    pub fn with_batch(mut self, batch: BatchConfig) -> Self {
        self.batch = batch;
        self
    }

    pub fn with_no_copy(mut self, no_copy: NoCopy) -> Self {
        self.no_copy = Some(no_copy);
        self
    }

    pub fn validate(&self) -> ImportResult<()> {
        if self.max_links == 0 {
            return Err(ImportError::InvalidConfig("max_links must be at least 1".into()));
        }
        if self.block_size_limit == 0 {
            return Err(ImportError::InvalidConfig(
                "block_size_limit must be non-zero".into(),
            ));
        }
        if let Some(prefix) = &self.prefix {
            prefix.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ImporterConfig::default();
        assert_eq!(config.max_links, 174);
        assert!(!config.raw_leaves);
        assert_eq!(config.block_size_limit, 1024 * 1024);
        assert_eq!(config.chunker, ChunkerSpec::Size(256 * 1024));
        assert!(config.prefix().unwrap().is_none());
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(ImporterConfig::from_toml_str("").unwrap(), ImporterConfig::default());
    }

    #[test]
    fn full_toml() {
        let config = ImporterConfig::from_toml_str(
            r#"
            max_links = 16
            raw_leaves = true
            cid_version = "v1"
            hash = "blake3"
            block_size_limit = 4096
            chunker = "size-1024"

            [batch]
            max_pending_nodes = 8
            "#,
        )
        .unwrap();
        assert_eq!(config.max_links, 16);
        assert!(config.raw_leaves);
        assert_eq!(config.chunker, ChunkerSpec::Size(1024));
        assert_eq!(config.batch.max_pending_nodes, 8);
        assert_eq!(config.batch.max_pending_bytes, 8 * 1024 * 1024);
        assert_eq!(
            config.prefix().unwrap(),
            Some(Prefix::v1(Codec::DagPb, HashFunction::Blake3))
        );
    }

    #[test]
    fn hash_alone_implies_v1() {
        let config = ImporterConfig {
            hash: Some(HashFunction::Sha2_256),
            ..Default::default()
        };
        assert_eq!(config.prefix().unwrap().unwrap().version, CidVersion::V1);
    }

    #[test]
    fn v0_with_blake3_rejected() {
        let err = ImporterConfig::from_toml_str("cid_version = \"v0\"\nhash = \"blake3\"").unwrap_err();
        assert!(matches!(err, ImportError::Type(_)));
    }

    #[test]
    fn zero_max_links_rejected() {
        let err = ImporterConfig::from_toml_str("max_links = 0").unwrap_err();
        assert!(matches!(err, ImportError::InvalidConfig(_)));
    }

    #[test]
    fn chunker_larger_than_limit_rejected() {
        let err = ImporterConfig::from_toml_str("block_size_limit = 100\nchunker = \"size-200\"")
            .unwrap_err();
        assert!(matches!(err, ImportError::InvalidConfig(_)));
    }

    #[test]
    fn bad_chunker_rejected() {
        let err = ImporterConfig::from_toml_str("chunker = \"rabin\"").unwrap_err();
        assert!(matches!(err, ImportError::InvalidConfig(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("importer.toml");
        std::fs::write(&path, "max_links = 3\n").unwrap();
        assert_eq!(ImporterConfig::load(&path).unwrap().max_links, 3);
    }

    #[test]
    fn params_from_config() {
        let config = ImporterConfig {
            max_links: 7,
            raw_leaves: true,
            ..Default::default()
        };
        let params = config.params().unwrap();
        assert_eq!(params.max_links, 7);
        assert!(params.raw_leaves);
        assert!(params.no_copy.is_none());
    }

    #[test]
    fn no_copy_for_file_resolves_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.bin");
        std::fs::write(&path, b"12345").unwrap();
        let no_copy = NoCopy::for_file(&path).unwrap();
        assert!(no_copy.full_path.is_absolute());
        assert_eq!(no_copy.stat.size, 5);
    }

    #[test]
    fn builder_params_validation() {
        assert!(BuilderParams::default().validate().is_ok());
        assert!(BuilderParams::default().with_max_links(0).validate().is_err());
        assert!(BuilderParams::default()
            .with_block_size_limit(0)
            .validate()
            .is_err());
    }
}
