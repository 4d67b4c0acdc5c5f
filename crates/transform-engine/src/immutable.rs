//! `ImmutableTransformerExecution`: the external-producer variant.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use transform_model::{ArtifactTransformDependencies, Identity, ImmutableIdentity, Result};

use crate::execution::BaseExecution;
use crate::fs_access::FileSystemAccess;
use crate::transformer::{InputChanges, Transformer};
use crate::visitor::{property_names, FilePropertyKind, IdentityInputVisitor, OutputVisitor, RegularInputVisitor};
use crate::workspace::{CachingDisabledReason, IncrementalBehavior, RawExecuteResult, UnitOfWork, Workspace};

/// Identity built from a normalized path and a root content hash rather than
/// a full content fingerprint — correct because external artifacts are
/// immutable at a given content address.
pub struct ImmutableTransformerExecution {
    base: BaseExecution,
}

impl ImmutableTransformerExecution {
    pub fn new(
        transformer: Arc<dyn Transformer>,
        fs_access: Arc<dyn FileSystemAccess>,
        input_artifact: PathBuf,
        dependencies: ArtifactTransformDependencies,
    ) -> Self {
        Self {
            base: BaseExecution::new(transformer, fs_access, input_artifact, dependencies, Instant::now()),
        }
    }
}

impl UnitOfWork for ImmutableTransformerExecution {
    fn display_name(&self) -> String {
        self.base.display_name()
    }

    fn identity(&self) -> Identity {
        let normalized_path = self
            .base
            .fs_access()
            .normalized_path(self.base.input_artifact(), self.base.transformer().input_artifact_normalizer());
        let content = self.base.fs_access().content_snapshot(self.base.input_artifact());
        let secondary_inputs = self.base.input_properties_hash_snapshot();
        let dependencies_hash = self.base.dependencies().hash();

        Identity::Immutable(ImmutableIdentity::new(
            normalized_path,
            content,
            secondary_inputs,
            dependencies_hash,
        ))
    }

    fn visit_identity_inputs(&self, visitor: &mut dyn IdentityInputVisitor) {
        let fs_access = self.base.fs_access_arc();
        let transformer = self.base.transformer_arc();
        let input_artifact = self.base.input_artifact().to_path_buf();

        let normalizer = transformer.input_artifact_normalizer();
        let path_snapshot = {
            let fs_access = Arc::clone(&fs_access);
            let input_artifact = input_artifact.clone();
            move || fs_access.normalized_path(&input_artifact, normalizer)
        };
        visitor.input_file_property(
            property_names::INPUT_ARTIFACT_PATH,
            FilePropertyKind::NonIncremental,
            &path_snapshot,
        );

        let content_snapshot = {
            let fs_access = Arc::clone(&fs_access);
            let input_artifact = input_artifact.clone();
            move || fs_access.content_snapshot(&input_artifact)
        };
        visitor.input_file_property(
            property_names::INPUT_ARTIFACT_SNAPSHOT,
            FilePropertyKind::NonIncremental,
            &content_snapshot,
        );

        let properties_hash = self.base.input_properties_hash_snapshot();
        let properties_value = move || properties_hash.clone();
        visitor.input_property(property_names::INPUT_PROPERTIES_HASH, &properties_value);

        self.base.visit_identity_dependencies(visitor);
    }

    fn visit_regular_inputs(&self, visitor: &mut dyn RegularInputVisitor) {
        self.base.visit_regular_inputs(visitor);
    }

    fn visit_outputs(&self, workspace: &Workspace, visitor: &mut dyn OutputVisitor) {
        self.base.visit_outputs(workspace, visitor);
    }

    fn should_disable_caching(&self) -> CachingDisabledReason {
        self.base.should_disable_caching()
    }

    fn incremental_behavior(&self) -> IncrementalBehavior {
        self.base.incremental_behavior()
    }

    fn execution_time(&self) -> std::time::Duration {
        self.base.execution_time()
    }

    fn execute(&self, workspace: &Workspace, changes: Option<&InputChanges>) -> RawExecuteResult {
        self.base.execute(workspace, changes)
    }

    fn load_restored_output(&self, workspace: &Workspace) -> Result<Vec<PathBuf>> {
        self.base.load_restored_output(workspace)
    }
}
