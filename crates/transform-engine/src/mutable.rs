//! `MutableTransformerExecution`: the project-local-producer variant.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use transform_model::{ArtifactTransformDependencies, Identity, MutableIdentity, Result};

use crate::execution::BaseExecution;
use crate::fs_access::FileSystemAccess;
use crate::transformer::{InputChanges, Transformer};
use crate::visitor::{IdentityInputVisitor, OutputVisitor, RegularInputVisitor};
use crate::workspace::{CachingDisabledReason, IncrementalBehavior, RawExecuteResult, UnitOfWork, Workspace};

/// Identity keyed on the absolute input path rather than a content hash: the
/// producing project may rewrite the input during the build, so up-to-date
/// checking is left to the engine's regular-inputs fingerprint instead of to
/// Identity.
pub struct MutableTransformerExecution {
    base: BaseExecution,
}

impl MutableTransformerExecution {
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

impl UnitOfWork for MutableTransformerExecution {
    fn display_name(&self) -> String {
        self.base.display_name()
    }

    fn identity(&self) -> Identity {
        let absolute_input_path = self.base.input_artifact().to_string_lossy().into_owned();
        let secondary_inputs = self.base.input_properties_hash_snapshot();
        let dependencies_hash = self.base.dependencies().hash();

        Identity::Mutable(MutableIdentity::new(
            absolute_input_path,
            secondary_inputs,
            dependencies_hash,
        ))
    }

    fn visit_identity_inputs(&self, visitor: &mut dyn IdentityInputVisitor) {
        // Unlike the Immutable variant, inherits the base inputs unchanged —
        // no `inputArtifactPath` / `inputArtifactSnapshot`.
        let properties_hash = self.base.input_properties_hash_snapshot();
        let properties_value = move || properties_hash.clone();
        visitor.input_property(
            crate::visitor::property_names::INPUT_PROPERTIES_HASH,
            &properties_value,
        );

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
