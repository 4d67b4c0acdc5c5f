use crate::hash::{HashDigest, IdentityHasher};
use crate::snapshot::Snapshot;

/// The value determining cache equivalence between transform invocations.
///
/// Two shapes exist because the workspace variant is selected up front by
/// [`crate::ComponentIdentifier`] and each variant hashes a different set of
/// fields — the order below is bit-exact and must never be reordered, since
/// it changes every previously-computed `unique_id()`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Identity {
    Immutable(ImmutableIdentity),
    Mutable(MutableIdentity),
}

impl Identity {
    pub fn unique_id(&self) -> HashDigest {
        match self {
            Identity::Immutable(id) => id.unique_id(),
            Identity::Mutable(id) => id.unique_id(),
        }
    }
}

/// Identity for a transform whose input artifact came from an external,
/// content-addressed producer (a module resolved from a repository).
///
/// Built from (normalized-input-artifact-path snapshot, raw-content
/// snapshot, secondary-inputs snapshot, dependencies hash).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ImmutableIdentity {
    pub normalized_path: Snapshot,
    pub content: Snapshot,
    pub secondary_inputs: Snapshot,
    pub dependencies_hash: HashDigest,
}

impl ImmutableIdentity {
    pub fn new(
        normalized_path: Snapshot,
        content: Snapshot,
        secondary_inputs: Snapshot,
        dependencies_hash: HashDigest,
    ) -> Self {
        Self {
            normalized_path,
            content,
            secondary_inputs,
            dependencies_hash,
        }
    }

    pub fn unique_id(&self) -> HashDigest {
        let mut hasher = IdentityHasher::new();
        self.normalized_path.append_to(&mut hasher);
        self.content.append_to(&mut hasher);
        self.secondary_inputs.append_to(&mut hasher);
        hasher.put_str(self.dependencies_hash.as_str());
        hasher.finish()
    }
}

/// Identity for a transform whose input artifact is produced by a local
/// project that may rewrite it during the build.
///
/// Built from (absolute input path, secondary-inputs snapshot, dependencies
/// hash). The path is used in place of a content hash because the producing
/// project can rewrite the input; the engine's regular-inputs fingerprint
/// (not identity) is what catches that case.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MutableIdentity {
    pub absolute_input_path: String,
    pub secondary_inputs: Snapshot,
    pub dependencies_hash: HashDigest,
}

impl MutableIdentity {
    pub fn new(
        absolute_input_path: impl Into<String>,
        secondary_inputs: Snapshot,
        dependencies_hash: HashDigest,
    ) -> Self {
        Self {
            absolute_input_path: absolute_input_path.into(),
            secondary_inputs,
            dependencies_hash,
        }
    }

    pub fn unique_id(&self) -> HashDigest {
        let mut hasher = IdentityHasher::new();
        hasher.put_str(&self.absolute_input_path);
        self.secondary_inputs.append_to(&mut hasher);
        hasher.put_str(self.dependencies_hash.as_str());
        hasher.finish()
    }
}
