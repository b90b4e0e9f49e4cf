use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Content identifier version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CidVersion {
    /// Legacy identifiers: a bare sha2-256 multihash of a dag-pb block.
    V0,
    /// Self-describing identifiers: version, codec and multihash.
    V1,
}

impl CidVersion {
    pub fn code(&self) -> u64 {
        match self {
            Self::V0 => 0,
            Self::V1 => 1,
        }
    }

    pub fn from_code(code: u64) -> Result<Self, TypeError> {
        match code {
            0 => Ok(Self::V0),
            1 => Ok(Self::V1),
            other => Err(TypeError::UnsupportedVersion(other)),
        }
    }
}

/// Block codec: how the bytes behind an identifier are to be interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Codec {
    /// Unwrapped bytes.
    Raw,
    /// Linked protobuf-style node: ordered links plus a data payload.
    DagPb,
}

impl Codec {
    /// Multicodec table code.
    pub fn code(&self) -> u64 {
        match self {
            Self::Raw => 0x55,
            Self::DagPb => 0x70,
        }
    }

    pub fn from_code(code: u64) -> Result<Self, TypeError> {
        match code {
            0x55 => Ok(Self::Raw),
            0x70 => Ok(Self::DagPb),
            other => Err(TypeError::UnknownCodec(other)),
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw => write!(f, "raw"),
            Self::DagPb => write!(f, "dag-pb"),
        }
    }
}

/// Hash function used to derive the identifier digest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HashFunction {
    #[serde(rename = "sha2-256")]
    Sha2_256,
    Blake3,
}

impl HashFunction {
    /// Multihash table code.
    pub fn code(&self) -> u64 {
        match self {
            Self::Sha2_256 => 0x12,
            Self::Blake3 => 0x1e,
        }
    }

    pub fn from_code(code: u64) -> Result<Self, TypeError> {
        match code {
            0x12 => Ok(Self::Sha2_256),
            0x1e => Ok(Self::Blake3),
            other => Err(TypeError::UnknownHashFunction(other)),
        }
    }
}

impl fmt::Display for HashFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha2_256 => write!(f, "sha2-256"),
            Self::Blake3 => write!(f, "blake3"),
        }
    }
}

/// The addressing scheme for a node: everything in a [`ContentId`] except
/// the digest itself.
///
/// All nodes of one tree share a prefix; the only variation allowed is the
/// codec, since raw leaves and linked nodes necessarily differ there.
///
/// [`ContentId`]: crate::ContentId
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Prefix {
    pub version: CidVersion,
    pub codec: Codec,
    pub hash: HashFunction,
}

impl Prefix {
    /// The legacy prefix: CIDv0, dag-pb, sha2-256.
    pub const fn v0() -> Self {
        Self {
            version: CidVersion::V0,
            codec: Codec::DagPb,
            hash: HashFunction::Sha2_256,
        }
    }

    /// A CIDv1 prefix with the given codec and hash function.
    pub const fn v1(codec: Codec, hash: HashFunction) -> Self {
        Self {
            version: CidVersion::V1,
            codec,
            hash,
        }
    }

    /// Build a prefix, rejecting combinations CIDv0 cannot express.
    pub fn new(version: CidVersion, codec: Codec, hash: HashFunction) -> Result<Self, TypeError> {
        let prefix = Self {
            version,
            codec,
            hash,
        };
        prefix.validate()?;
        Ok(prefix)
    }

    pub fn validate(&self) -> Result<(), TypeError> {
        if self.version == CidVersion::V0
            && (self.codec != Codec::DagPb || self.hash != HashFunction::Sha2_256)
        {
            return Err(TypeError::InvalidV0Prefix {
                codec: self.codec.to_string(),
                hash: self.hash.to_string(),
            });
        }
        Ok(())
    }

    /// The same prefix with a different codec.
    ///
    /// A v0 prefix can only name dag-pb blocks, so switching it to any other
    /// codec upgrades it to v1.
    pub fn with_codec(&self, codec: Codec) -> Self {
        if codec == self.codec {
            return *self;
        }
        Self {
            version: CidVersion::V1,
            codec,
            hash: self.hash,
        }
    }
}

impl Default for Prefix {
    fn default() -> Self {
        Self::v0()
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cidv{}/{}/{}", self.version.code(), self.codec, self.hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v0_is_dag_pb_sha256() {
        let p = Prefix::v0();
        assert_eq!(p.codec, Codec::DagPb);
        assert_eq!(p.hash, HashFunction::Sha2_256);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn v0_rejects_raw_codec() {
        let err = Prefix::new(CidVersion::V0, Codec::Raw, HashFunction::Sha2_256).unwrap_err();
        assert!(matches!(err, TypeError::InvalidV0Prefix { .. }));
    }

    #[test]
    fn v0_rejects_blake3() {
        assert!(Prefix::new(CidVersion::V0, Codec::DagPb, HashFunction::Blake3).is_err());
    }

    #[test]
    fn with_codec_upgrades_v0() {
        let raw = Prefix::v0().with_codec(Codec::Raw);
        assert_eq!(raw.version, CidVersion::V1);
        assert_eq!(raw.codec, Codec::Raw);
        assert_eq!(raw.hash, HashFunction::Sha2_256);
    }

    #[test]
    fn with_same_codec_is_identity() {
        let p = Prefix::v1(Codec::DagPb, HashFunction::Blake3);
        assert_eq!(p.with_codec(Codec::DagPb), p);
        assert_eq!(Prefix::v0().with_codec(Codec::DagPb), Prefix::v0());
    }

    #[test]
    fn codes_roundtrip() {
        for codec in [Codec::Raw, Codec::DagPb] {
            assert_eq!(Codec::from_code(codec.code()).unwrap(), codec);
        }
        for hash in [HashFunction::Sha2_256, HashFunction::Blake3] {
            assert_eq!(HashFunction::from_code(hash.code()).unwrap(), hash);
        }
        assert_eq!(Codec::from_code(0x71).unwrap_err(), TypeError::UnknownCodec(0x71));
        assert!(CidVersion::from_code(2).is_err());
    }

    #[test]
    fn serde_names() {
        let p = Prefix::v1(Codec::DagPb, HashFunction::Sha2_256);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"{"version":"v1","codec":"dag-pb","hash":"sha2-256"}"#);
        let parsed: Prefix = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, p);
    }

    #[test]
    fn display() {
        assert_eq!(Prefix::v0().to_string(), "cidv0/dag-pb/sha2-256");
    }
}
