//! `AbstractTransformerExecution`: the shared contribution both execution
//! variants build on.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use transform_model::{ArtifactTransformDependencies, HashDigest, Result, Snapshot, TransformError};

use crate::fs_access::FileSystemAccess;
use crate::results;
use crate::transformer::{InputChanges, Transformer};
use crate::visitor::{
    property_names, FilePropertyKind, IdentityInputVisitor, OutputVisitor, RegularInputVisitor,
};
use crate::workspace::{CachingDisabledReason, IncrementalBehavior, RawExecuteResult, Workspace};

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Fields and behavior shared by [`crate::immutable::ImmutableTransformerExecution`]
/// and [`crate::mutable::MutableTransformerExecution`] (design note 9:
/// "tagged variant plus a shared trait for declare inputs/outputs/execute").
pub struct BaseExecution {
    transformer: Arc<dyn Transformer>,
    fs_access: Arc<dyn FileSystemAccess>,
    input_artifact: PathBuf,
    dependencies: ArtifactTransformDependencies,
    created_at: Instant,
}

impl BaseExecution {
    pub fn new(
        transformer: Arc<dyn Transformer>,
        fs_access: Arc<dyn FileSystemAccess>,
        input_artifact: PathBuf,
        dependencies: ArtifactTransformDependencies,
        created_at: Instant,
    ) -> Self {
        Self {
            transformer,
            fs_access,
            input_artifact,
            dependencies,
            created_at,
        }
    }

    pub fn transformer(&self) -> &dyn Transformer {
        self.transformer.as_ref()
    }

    pub fn transformer_arc(&self) -> Arc<dyn Transformer> {
        Arc::clone(&self.transformer)
    }

    pub fn fs_access(&self) -> &dyn FileSystemAccess {
        self.fs_access.as_ref()
    }

    pub fn fs_access_arc(&self) -> Arc<dyn FileSystemAccess> {
        Arc::clone(&self.fs_access)
    }

    pub fn input_artifact(&self) -> &Path {
        &self.input_artifact
    }

    pub fn dependencies(&self) -> &ArtifactTransformDependencies {
        &self.dependencies
    }

    /// `"<transformer.displayName> <inputArtifact.basename>"`.
    pub fn display_name(&self) -> String {
        format!(
            "{} {}",
            self.transformer.display_name(),
            basename(&self.input_artifact)
        )
    }

    pub fn should_disable_caching(&self) -> CachingDisabledReason {
        if self.transformer.is_cacheable() {
            CachingDisabledReason::Enabled
        } else {
            CachingDisabledReason::not_cacheable()
        }
    }

    pub fn incremental_behavior(&self) -> IncrementalBehavior {
        if self.transformer.requires_input_changes() {
            IncrementalBehavior::IncrementalParameters
        } else {
            IncrementalBehavior::None
        }
    }

    pub fn execution_time(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// The `inputPropertiesHash` identity property, shared by both variants.
    pub fn input_properties_hash_snapshot(&self) -> Snapshot {
        let hash: HashDigest = self.transformer.secondary_input_hash();
        Snapshot::from_bytes(hash.as_str().as_bytes())
    }

    /// `inputArtifactDependencies`, declared in the base class with the
    /// transformer's own normalizer/directory-sensitivity. Falls back to an
    /// empty snapshot when there are no dependency files.
    pub fn visit_identity_dependencies(&self, visitor: &mut dyn IdentityInputVisitor) {
        let dependencies_hash = self.dependencies.hash();
        let value = move || Snapshot::from_bytes(dependencies_hash.as_str().as_bytes());
        visitor.input_file_property(
            property_names::INPUT_ARTIFACT_DEPENDENCIES,
            FilePropertyKind::NonIncremental,
            &value,
        );
    }

    pub fn visit_regular_inputs(&self, visitor: &mut dyn RegularInputVisitor) {
        let fs_access = Arc::clone(&self.fs_access);
        let input_artifact = self.input_artifact.clone();
        let value = move || fs_access.content_snapshot(&input_artifact);
        visitor.input_file_property(
            property_names::INPUT_ARTIFACT,
            self.transformer.input_artifact_normalizer(),
            self.transformer.input_artifact_directory_sensitivity(),
            &value,
        );
    }

    pub fn visit_outputs(&self, workspace: &Workspace, visitor: &mut dyn OutputVisitor) {
        visitor.output_directory(property_names::OUTPUT_DIRECTORY, &workspace.transformed_dir());
        visitor.output_file(property_names::RESULTS_FILE, &workspace.results_file());
    }

    /// Runs the transformer inside a named span and encodes `results.bin`.
    /// Returns the raw (unwrapped) outcome — see
    /// [`crate::workspace::RawExecuteResult`].
    pub fn execute(&self, workspace: &Workspace, changes: Option<&InputChanges>) -> RawExecuteResult {
        let span_name = self.display_name();
        let _span = tracing::info_span!("transformer_execution", name = %span_name).entered();

        let output_dir = workspace.transformed_dir();
        std::fs::create_dir_all(&output_dir).map_err(box_err)?;

        let outputs = self
            .transformer
            .transform(&self.input_artifact, &output_dir, &self.dependencies, changes)?;

        let text = results::encode(&outputs, &output_dir, &self.input_artifact).map_err(box_err)?;
        write_results_file(&workspace.results_file(), &text).map_err(box_err)?;

        Ok(outputs)
    }

    pub fn load_restored_output(&self, workspace: &Workspace) -> Result<Vec<PathBuf>> {
        let text = std::fs::read_to_string(workspace.results_file())?;
        results::decode(&text, &workspace.transformed_dir(), &self.input_artifact)
    }
}

fn box_err<E: std::error::Error + Send + Sync + 'static>(
    err: E,
) -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(err)
}

/// Writes `results.bin` via a temp-file-then-rename so a reader never
/// observes a partially-written manifest, matching the host toolchain's
/// atomic cache-file writer.
fn write_results_file(path: &Path, text: &str) -> std::result::Result<(), std::io::Error> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    use std::io::Write as _;
    tmp.write_all(text.as_bytes())?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Turns a boxed transformer/IO failure into the public error surfaced to
/// callers of an `Invocation`.
pub fn wrap_execution_error(
    display_name: String,
    source: Box<dyn std::error::Error + Send + Sync>,
) -> TransformError {
    TransformError::Execution {
        display_name,
        source,
    }
}
