use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::prefix::{CidVersion, Codec, HashFunction, Prefix};
use crate::varint;

/// Digest length of every supported hash function.
pub const DIGEST_LEN: usize = 32;

/// Content-addressed identifier for a stored node.
///
/// A `ContentId` is a [`Prefix`] plus the digest of the node's encoded bytes.
/// Identical content under the same prefix always produces the same
/// identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentId {
    prefix: Prefix,
    digest: [u8; DIGEST_LEN],
}

impl ContentId {
    /// Assemble an identifier from a prefix and a pre-computed digest.
    pub fn new(prefix: Prefix, digest: [u8; DIGEST_LEN]) -> Self {
        Self { prefix, digest }
    }

    pub fn prefix(&self) -> Prefix {
        self.prefix
    }

    pub fn version(&self) -> CidVersion {
        self.prefix.version
    }

    pub fn digest(&self) -> &[u8; DIGEST_LEN] {
        &self.digest
    }

    /// Binary form.
    ///
    /// v0 is the bare multihash; v1 is `version | codec | multihash`, each
    /// header field an unsigned varint.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(DIGEST_LEN + 4);
        if self.prefix.version == CidVersion::V1 {
            varint::encode(&mut buf, self.prefix.version.code());
            varint::encode(&mut buf, self.prefix.codec.code());
        }
        varint::encode(&mut buf, self.prefix.hash.code());
        varint::encode(&mut buf, DIGEST_LEN as u64);
        buf.extend_from_slice(&self.digest);
        buf
    }

    /// Parse the binary form produced by [`ContentId::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypeError> {
        // A v0 identifier starts with the sha2-256 code, which is never a
        // valid version number.
        if bytes.first() == Some(&(HashFunction::Sha2_256.code() as u8)) {
            let digest = parse_multihash(bytes, HashFunction::Sha2_256)?;
            return Ok(Self::new(Prefix::v0(), digest));
        }

        let (version, n) = varint::decode(bytes)?;
        if version != CidVersion::V1.code() {
            return Err(TypeError::UnsupportedVersion(version));
        }
        let rest = &bytes[n..];
        let (codec, n) = varint::decode(rest)?;
        let codec = Codec::from_code(codec)?;
        let multihash = &rest[n..];
        let (hash, _) = varint::decode(multihash)?;
        let hash = HashFunction::from_code(hash)?;
        let digest = parse_multihash(multihash, hash)?;
        Ok(Self::new(Prefix::v1(codec, hash), digest))
    }

    /// Hex-encoded binary form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Short hex representation (first 8 characters of the digest).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.digest[..4])
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Self::from_bytes(&bytes)
    }
}

/// Parse `code | length | digest`, checking the code against `hash`.
fn parse_multihash(bytes: &[u8], hash: HashFunction) -> Result<[u8; DIGEST_LEN], TypeError> {
    let (code, n) = varint::decode(bytes)?;
    if code != hash.code() {
        return Err(TypeError::UnknownHashFunction(code));
    }
    let rest = &bytes[n..];
    let (len, n) = varint::decode(rest)?;
    let digest = &rest[n..];
    if len as usize != DIGEST_LEN || digest.len() != DIGEST_LEN {
        return Err(TypeError::InvalidLength {
            expected: DIGEST_LEN,
            actual: digest.len(),
        });
    }
    let mut arr = [0u8; DIGEST_LEN];
    arr.copy_from_slice(digest);
    Ok(arr)
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentId({}:{})", self.prefix.codec, self.short_hex())
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
