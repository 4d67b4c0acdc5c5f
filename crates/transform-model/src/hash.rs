use sha2::{Digest as _, Sha256};
use std::fmt;

/// Deterministic, ordered-field hasher used to compute an [`crate::Identity`]'s
/// `unique_id()`.
///
/// Every write is length-prefixed so that feeding `"ab"` then `"c"` never
/// collides with feeding `"a"` then `"bc"` — this is what makes the ordering
/// of hasher inputs in `Identity::unique_id()` bit-exact rather than merely
/// "probably fine".
#[derive(Default)]
pub struct IdentityHasher {
    inner: Sha256,
}

impl IdentityHasher {
    pub fn new() -> Self {
        Self {
            inner: Sha256::new(),
        }
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.inner.update((bytes.len() as u64).to_le_bytes());
        self.inner.update(bytes);
        self
    }

    pub fn put_str(&mut self, s: &str) -> &mut Self {
        self.put_bytes(s.as_bytes())
    }

    pub fn finish(self) -> HashDigest {
        HashDigest(hex::encode(self.inner.finalize()))
    }
}

/// A stable SHA-256 digest, stored as a lowercase hex string.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HashDigest(String);

impl HashDigest {
    pub fn from_bytes(bytes: impl AsRef<[u8]>) -> Self {
        let mut hasher = IdentityHasher::new();
        hasher.put_bytes(bytes.as_ref());
        hasher.finish()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HashDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl AsRef<str> for HashDigest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_str_is_length_prefixed_to_avoid_boundary_collisions() {
        let mut a = IdentityHasher::new();
        a.put_str("ab").put_str("c");

        let mut b = IdentityHasher::new();
        b.put_str("a").put_str("bc");

        assert_ne!(a.finish(), b.finish());
    }

    #[test]
    fn from_bytes_is_deterministic() {
        assert_eq!(
            HashDigest::from_bytes(b"hello"),
            HashDigest::from_bytes(b"hello")
        );
        assert_ne!(
            HashDigest::from_bytes(b"hello"),
            HashDigest::from_bytes(b"world")
        );
    }
}
