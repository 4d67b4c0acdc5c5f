use std::path::{Path, PathBuf};

use crate::hash::HashDigest;

/// Identifies the component that is the initial source of the artifact being
/// transformed.
///
/// This is the switch that selects the workspace variant: a project-local
/// producer selects [`crate::MutableIdentity`], anything else (a module
/// resolved from a repository, a file outside any project) selects
/// [`crate::ImmutableIdentity`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ComponentIdentifier {
    /// A project within the current build, identified by build path and
    /// project path (e.g. the root build's `:lib` project).
    Project {
        build_path: String,
        project_path: String,
    },
    /// A component resolved from a repository (a module, a file dependency,
    /// ...), identified by its display name.
    External { display_name: String },
}

impl ComponentIdentifier {
    pub fn project(build_path: impl Into<String>, project_path: impl Into<String>) -> Self {
        Self::Project {
            build_path: build_path.into(),
            project_path: project_path.into(),
        }
    }

    pub fn external(display_name: impl Into<String>) -> Self {
        Self::External {
            display_name: display_name.into(),
        }
    }

    pub fn is_project(&self) -> bool {
        matches!(self, ComponentIdentifier::Project { .. })
    }
}

/// The subject of a transformation: the component whose artifact is being
/// transformed.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TransformationSubject {
    pub initial_component_identifier: ComponentIdentifier,
}

impl TransformationSubject {
    pub fn new(initial_component_identifier: ComponentIdentifier) -> Self {
        Self {
            initial_component_identifier,
        }
    }

    pub fn is_producer_project(&self) -> bool {
        self.initial_component_identifier.is_project()
    }
}

/// The transitive dependencies of the input artifact, as a flat file list.
///
/// Zero or more files; order is significant for the dependencies hash fed
/// into Identity, so callers should produce it deterministically (e.g.
/// already sorted by the resolver).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArtifactTransformDependencies {
    files: Vec<PathBuf>,
}

impl ArtifactTransformDependencies {
    pub fn empty() -> Self {
        Self { files: Vec::new() }
    }

    pub fn new(files: Vec<PathBuf>) -> Self {
        Self { files }
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The `inputArtifactDependencies` file-input hash fed into Identity.
    ///
    /// Hashes each path's UTF-8 bytes in order; an empty dependency set
    /// still produces a stable (non-degenerate) digest rather than being
    /// treated as "absent".
    pub fn hash(&self) -> HashDigest {
        use crate::hash::IdentityHasher;

        let mut hasher = IdentityHasher::new();
        hasher.put_bytes(&(self.files.len() as u64).to_le_bytes());
        for file in &self.files {
            hasher.put_str(&path_to_hash_string(file));
        }
        hasher.finish()
    }
}

fn path_to_hash_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
