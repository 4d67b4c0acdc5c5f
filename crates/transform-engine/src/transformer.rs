use std::error::Error;
use std::path::{Path, PathBuf};

use transform_model::{ArtifactTransformDependencies, HashDigest};

use crate::visitor::{DirectorySensitivity, FileNormalizer};

/// Opaque, host-supplied change information for an incremental invocation.
///
/// Only produced when the execution unit's [`crate::workspace::IncrementalBehavior`]
/// is `IncrementalParameters` and the engine has a prior execution to diff
/// against; otherwise `transform` is called with `None`.
#[derive(Clone, Debug, Default)]
pub struct InputChanges {
    pub changed_files: Vec<PathBuf>,
}

/// The user-supplied artifact transform.
///
/// This core never constructs a `Transformer` itself — it is handed one by
/// the host build tool and only calls the methods below.
pub trait Transformer: Send + Sync {
    fn display_name(&self) -> &str;

    /// Identifies the transformer's implementation (class + classpath, in
    /// the host's terms). Used by the host engine as part of the broader
    /// cache key alongside this crate's `Identity`; this crate never reads
    /// it beyond carrying it through.
    fn implementation_class(&self) -> &str;

    fn secondary_input_hash(&self) -> HashDigest;

    fn input_artifact_normalizer(&self) -> FileNormalizer;
    fn input_artifact_directory_sensitivity(&self) -> DirectorySensitivity;

    fn input_artifact_dependencies_normalizer(&self) -> FileNormalizer;
    fn input_artifact_dependencies_directory_sensitivity(&self) -> DirectorySensitivity;

    fn is_cacheable(&self) -> bool;
    fn requires_input_changes(&self) -> bool;

    /// Runs the transform. `output_dir` is always `workspace/transformed/`.
    /// Returns the produced files, in the order they should be recorded.
    fn transform(
        &self,
        input_artifact: &Path,
        output_dir: &Path,
        dependencies: &ArtifactTransformDependencies,
        changes: Option<&InputChanges>,
    ) -> Result<Vec<PathBuf>, Box<dyn Error + Send + Sync>>;
}
