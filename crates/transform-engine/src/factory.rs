//! `InvocationFactory`: the entry point a host build tool calls.

use std::path::PathBuf;
use std::sync::Arc;

use transform_model::{ArtifactTransformDependencies, Result, TransformationSubject};

use crate::execution::wrap_execution_error;
use crate::fs_access::FileSystemAccess;
use crate::immutable::ImmutableTransformerExecution;
use crate::listener::{InvocationSpan, TransformerInvocationListener};
use crate::mutable::MutableTransformerExecution;
use crate::transformer::Transformer;
use crate::workspace::{EngineHandle, ExecutionEngine, UnitOfWork};

/// Either `create_invocation`'s synchronous outcome or the work still to be
/// done: a deferred-execution handle.
pub enum Invocation {
    /// A matching identity was already cached. No listener events fire for
    /// this value.
    Cached(Vec<PathBuf>),
    /// Must actually run. `force()` drives the `execute()` call, wrapped in
    /// before/after listener events.
    NonCached(Box<dyn FnOnce() -> Result<Vec<PathBuf>> + Send>),
}

impl Invocation {
    pub fn is_cached(&self) -> bool {
        matches!(self, Invocation::Cached(_))
    }

    pub fn force(self) -> Result<Vec<PathBuf>> {
        match self {
            Invocation::Cached(outputs) => Ok(outputs),
            Invocation::NonCached(thunk) => thunk(),
        }
    }
}

/// Dispatches on producer-project presence, submits to the matching
/// execution engine, and returns a deferred/cached invocation handle.
pub struct InvocationFactory {
    /// Workspace services for a project-local producer (per-project, or at
    /// least per-build; real hosts resolve this per `ComponentIdentifier::Project`).
    project_engine: Arc<dyn ExecutionEngine>,
    /// The shared, cross-build workspace service for external artifacts.
    immutable_engine: Arc<dyn ExecutionEngine>,
    fs_access: Arc<dyn FileSystemAccess>,
    listener: Arc<dyn TransformerInvocationListener>,
}

impl InvocationFactory {
    pub fn new(
        project_engine: Arc<dyn ExecutionEngine>,
        immutable_engine: Arc<dyn ExecutionEngine>,
        fs_access: Arc<dyn FileSystemAccess>,
        listener: Arc<dyn TransformerInvocationListener>,
    ) -> Self {
        Self {
            project_engine,
            immutable_engine,
            fs_access,
            listener,
        }
    }

    pub fn create_invocation(
        &self,
        transformer: Arc<dyn Transformer>,
        input_artifact: PathBuf,
        dependencies: ArtifactTransformDependencies,
        subject: TransformationSubject,
    ) -> Invocation {
        let is_project = subject.is_producer_project();
        let engine = if is_project {
            Arc::clone(&self.project_engine)
        } else {
            Arc::clone(&self.immutable_engine)
        };

        let unit: Box<dyn UnitOfWork> = if is_project {
            Box::new(MutableTransformerExecution::new(
                Arc::clone(&transformer),
                Arc::clone(&self.fs_access),
                input_artifact,
                dependencies,
            ))
        } else {
            Box::new(ImmutableTransformerExecution::new(
                Arc::clone(&transformer),
                Arc::clone(&self.fs_access),
                input_artifact,
                dependencies,
            ))
        };

        let display_name = unit.display_name();

        match engine.submit(unit) {
            EngineHandle::Cached(outputs) => Invocation::Cached(outputs),
            EngineHandle::Deferred(run) => {
                let listener = Arc::clone(&self.listener);
                Invocation::NonCached(Box::new(move || {
                    let _span = InvocationSpan::enter(listener.as_ref(), display_name.clone(), subject);
                    run().map_err(|source| wrap_execution_error(display_name, source))
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transformer::InputChanges;
    use crate::workspace::Workspace;
    use crate::visitor::{FileNormalizer, DirectorySensitivity};
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use transform_model::{ComponentIdentifier, HashDigest, Snapshot, TransformError};

    struct StubTransformer;

    impl Transformer for StubTransformer {
        fn display_name(&self) -> &str {
            "Unzip"
        }
        fn implementation_class(&self) -> &str {
            "example.Unzip"
        }
        fn secondary_input_hash(&self) -> HashDigest {
            HashDigest::from_bytes(b"\xAA")
        }
        fn input_artifact_normalizer(&self) -> FileNormalizer {
            FileNormalizer::AbsolutePath
        }
        fn input_artifact_directory_sensitivity(&self) -> DirectorySensitivity {
            DirectorySensitivity::Default
        }
        fn input_artifact_dependencies_normalizer(&self) -> FileNormalizer {
            FileNormalizer::RelativePath
        }
        fn input_artifact_dependencies_directory_sensitivity(&self) -> DirectorySensitivity {
            DirectorySensitivity::Default
        }
        fn is_cacheable(&self) -> bool {
            true
        }
        fn requires_input_changes(&self) -> bool {
            false
        }
        fn transform(
            &self,
            _input_artifact: &Path,
            _output_dir: &Path,
            _dependencies: &ArtifactTransformDependencies,
            _changes: Option<&InputChanges>,
        ) -> std::result::Result<Vec<PathBuf>, Box<dyn std::error::Error + Send + Sync>> {
            Err("boom".into())
        }
    }

    struct NullFileSystemAccess;
    impl FileSystemAccess for NullFileSystemAccess {
        fn normalized_path(&self, path: &Path, _normalizer: FileNormalizer) -> Snapshot {
            Snapshot::from_str(&path.to_string_lossy())
        }
        fn content_snapshot(&self, path: &Path) -> Snapshot {
            Snapshot::from_str(&path.to_string_lossy())
        }
    }

    struct NullListener {
        before: AtomicUsize,
        after: AtomicUsize,
    }
    impl TransformerInvocationListener for NullListener {
        fn before_transformer_invocation(&self, _name: &str, _subject: &TransformationSubject) {
            self.before.fetch_add(1, Ordering::SeqCst);
        }
        fn after_transformer_invocation(&self, _name: &str, _subject: &TransformationSubject) {
            self.after.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct AlwaysRunEngine;
    impl ExecutionEngine for AlwaysRunEngine {
        fn submit(&self, unit: Box<dyn UnitOfWork>) -> EngineHandle {
            EngineHandle::Deferred(Box::new(move || {
                let workspace = Workspace::at(std::env::temp_dir());
                unit.execute(&workspace, None)
            }))
        }
    }

    #[test]
    fn failure_propagation_wraps_cause_and_fires_after() {
        let listener = Arc::new(NullListener {
            before: AtomicUsize::new(0),
            after: AtomicUsize::new(0),
        });
        let engine: Arc<dyn ExecutionEngine> = Arc::new(AlwaysRunEngine);
        let factory = InvocationFactory::new(
            Arc::clone(&engine),
            Arc::clone(&engine),
            Arc::new(NullFileSystemAccess),
            Arc::clone(&listener) as Arc<dyn TransformerInvocationListener>,
        );

        let invocation = factory.create_invocation(
            Arc::new(StubTransformer),
            PathBuf::from("/repo/.cache/lib.jar"),
            ArtifactTransformDependencies::empty(),
            TransformationSubject::new(ComponentIdentifier::external("com.foo:bar:1.0")),
        );
        assert!(!invocation.is_cached());

        let err = invocation.force().unwrap_err();
        match err {
            TransformError::Execution { display_name, .. } => {
                assert_eq!(display_name, "Unzip lib.jar");
            }
            other => panic!("expected Execution, got {other:?}"),
        }
        assert_eq!(listener.before.load(Ordering::SeqCst), 1);
        assert_eq!(listener.after.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cached_invocation_fires_no_listener_events() {
        struct CachedEngine;
        impl ExecutionEngine for CachedEngine {
            fn submit(&self, _unit: Box<dyn UnitOfWork>) -> EngineHandle {
                EngineHandle::Cached(vec![PathBuf::from("/ws/transformed/lib.class")])
            }
        }

        let listener = Arc::new(NullListener {
            before: AtomicUsize::new(0),
            after: AtomicUsize::new(0),
        });
        let engine: Arc<dyn ExecutionEngine> = Arc::new(CachedEngine);
        let factory = InvocationFactory::new(
            Arc::clone(&engine),
            Arc::clone(&engine),
            Arc::new(NullFileSystemAccess),
            Arc::clone(&listener) as Arc<dyn TransformerInvocationListener>,
        );

        let invocation = factory.create_invocation(
            Arc::new(StubTransformer),
            PathBuf::from("/repo/.cache/lib.jar"),
            ArtifactTransformDependencies::empty(),
            TransformationSubject::new(ComponentIdentifier::external("com.foo:bar:1.0")),
        );
        assert!(invocation.is_cached());
        let outputs = invocation.force().unwrap();
        assert_eq!(outputs, vec![PathBuf::from("/ws/transformed/lib.class")]);
        assert_eq!(listener.before.load(Ordering::SeqCst), 0);
        assert_eq!(listener.after.load(Ordering::SeqCst), 0);
    }
}
