use chunktree_types::{ContentId, HashFunction, Prefix, DIGEST_LEN};
use sha2::{Digest, Sha256};

/// Prefix-bound content hasher.
///
/// The prefix selects the hash function; version and codec are carried into
/// the resulting identifier unchanged. Unlike domain-separated hashing, the
/// digest covers exactly the encoded block bytes so identifiers stay
/// interoperable with other content-addressed systems.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContentHasher {
    prefix: Prefix,
}

impl ContentHasher {
    pub const fn new(prefix: Prefix) -> Self {
        Self { prefix }
    }

    /// Hash encoded block bytes into a content identifier.
    pub fn hash(&self, data: &[u8]) -> ContentId {
        ContentId::new(self.prefix, digest(self.prefix.hash, data))
    }

    /// Verify that data produces the expected identifier.
    pub fn verify(&self, data: &[u8], expected: &ContentId) -> bool {
        self.hash(data) == *expected
    }

    pub fn prefix(&self) -> Prefix {
        self.prefix
    }
}

/// Raw digest of `data` under `hash`.
pub fn digest(hash: HashFunction, data: &[u8]) -> [u8; DIGEST_LEN] {
    match hash {
        HashFunction::Sha2_256 => Sha256::digest(data).into(),
        HashFunction::Blake3 => *blake3::hash(data).as_bytes(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chunktree_types::Codec;

    #[test]
    fn hash_is_deterministic() {
        let hasher = ContentHasher::new(Prefix::v0());
        assert_eq!(hasher.hash(b"hello world"), hasher.hash(b"hello world"));
    }

    #[test]
    fn sha256_known_vector() {
        let d = digest(HashFunction::Sha2_256, b"abc");
        assert_eq!(
            hex::encode(d),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn blake3_matches_library() {
        let d = digest(HashFunction::Blake3, b"abc");
        assert_eq!(d, *blake3::hash(b"abc").as_bytes());
    }

    #[test]
    fn different_hash_functions_differ() {
        let sha = ContentHasher::new(Prefix::v1(Codec::Raw, HashFunction::Sha2_256));
        let b3 = ContentHasher::new(Prefix::v1(Codec::Raw, HashFunction::Blake3));
        assert_ne!(sha.hash(b"data").digest(), b3.hash(b"data").digest());
    }

    #[test]
    fn codec_changes_id_but_not_digest() {
        let raw = ContentHasher::new(Prefix::v1(Codec::Raw, HashFunction::Sha2_256));
        let pb = ContentHasher::new(Prefix::v1(Codec::DagPb, HashFunction::Sha2_256));
        let a = raw.hash(b"same");
        let b = pb.hash(b"same");
        assert_ne!(a, b);
        assert_eq!(a.digest(), b.digest());
    }

    #[test]
    fn verify_correct_and_tampered() {
        let hasher = ContentHasher::new(Prefix::v0());
        let id = hasher.hash(b"original");
        assert!(hasher.verify(b"original", &id));
        assert!(!hasher.verify(b"tampered", &id));
    }
}
