use ledgerscope_types::{Digest, DIGEST_LEN};
use sha2::{Digest as _, Sha512};

/// SHA-512 truncated to its first 32 bytes.
pub fn sha512_half(data: &[u8]) -> Digest {
    let mut hasher = NodeHasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Incremental SHA-512-half hasher.
///
/// Node blobs are keyed by the SHA-512-half of their payload. The same
/// hasher is reused for ledger headers, which are hashed field by field.
#[derive(Clone, Default)]
pub struct NodeHasher {
    inner: Sha512,
}

impl NodeHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed more bytes into the hash.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update(data);
        self
    }

    /// Finish and keep the first 32 bytes of the 64-byte SHA-512 output.
    pub fn finalize(self) -> Digest {
        let full = self.inner.finalize();
        let mut half = [0u8; DIGEST_LEN];
        half.copy_from_slice(&full[..DIGEST_LEN]);
        Digest::from_array(half)
    }

    /// Verify that `data` hashes to `expected`.
    pub fn verify(data: &[u8], expected: &Digest) -> bool {
        sha512_half(data) == *expected
    }
}

impl std::fmt::Debug for NodeHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeHasher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_matches_known_vector() {
        // First half of SHA-512("").
        let expected = "CF83E1357EEFB8BDF1542850D66D8007D620E4050B5715DC83F4A921D36CE9CE";
        assert_eq!(sha512_half(b"").to_hex(), expected);
    }

    #[test]
    fn abc_matches_known_vector() {
        let expected = "DDAF35A193617ABACC417349AE20413112E6FA4E89A97EA20A9EEEE64B55D39A";
        assert_eq!(sha512_half(b"abc").to_hex(), expected);
    }

    #[test]
    fn incremental_equals_one_shot() {
        let mut hasher = NodeHasher::new();
        hasher.update(b"hello ").update(b"world");
        assert_eq!(hasher.finalize(), sha512_half(b"hello world"));
    }

    #[test]
    fn verify_detects_tampering() {
        let id = sha512_half(b"stored payload");
        assert!(NodeHasher::verify(b"stored payload", &id));
        assert!(!NodeHasher::verify(b"tampered", &id));
    }
}
