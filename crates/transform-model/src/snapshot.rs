use crate::hash::IdentityHasher;

/// An opaquely-typed, host-supplied fingerprint of some input: a normalized
/// path, a file's content hash, a bag of secondary-input values, and so on.
///
/// The real file-system snapshotter and value-snapshotter live outside this
/// crate as external collaborators. What they hand back always reduces to
/// the same contract: a canonical byte sequence that can be appended to an
/// [`IdentityHasher`] and compared for structural equality. `Snapshot` is
/// that minimal, concrete realization of the contract.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Snapshot(Vec<u8>);

impl Snapshot {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn from_str(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }

    pub fn append_to(&self, hasher: &mut IdentityHasher) {
        hasher.put_bytes(&self.0);
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_snapshots_append_identically() {
        use crate::hash::IdentityHasher;

        let a = Snapshot::from_str("src/Main.java");
        let b = Snapshot::from_str("src/Main.java");
        assert_eq!(a, b);

        let mut ha = IdentityHasher::new();
        a.append_to(&mut ha);
        let mut hb = IdentityHasher::new();
        b.append_to(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn different_snapshots_are_not_equal() {
        assert_ne!(Snapshot::from_str("a"), Snapshot::from_str("b"));
    }
}
