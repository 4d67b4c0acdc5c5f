//! Reference, in-process `ExecutionEngine`.
//!
//! Not part of the portable contract: a real host build tool supplies its
//! own engine with real scheduling, up-to-date checking and locking. This
//! module exists so `transform-engine`'s own tests (and any downstream
//! crate enabling `test-support`) can drive the whole
//! factory → cache → execute → codec loop without one.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use transform_model::{HashDigest, Snapshot};

use crate::fs_access::FileSystemAccess;
use crate::visitor::FileNormalizer;
use crate::workspace::{EngineHandle, ExecutionEngine, UnitOfWork, Workspace};

/// Allocates one workspace directory per `unique_id()` under `root`.
///
/// Two flavors, matching the two ways workspaces are expected to persist —
/// across builds for the immutable variant, within a build for the mutable
/// variant:
/// - [`Self::immutable`] trusts a `results.bin` found on disk unconditionally,
///   surviving process restarts.
/// - [`Self::mutable`] trusts it only once this process has itself recorded
///   the identity (via the in-memory index) — a `results.bin` left over from
///   an earlier process is treated as a miss, forcing re-execution.
///
/// Serializes `submit()` behind a single coarse mutex — real concurrency and
/// per-identity locking is the host's job.
pub struct ReferenceExecutionEngine {
    root: PathBuf,
    trust_disk_across_restarts: bool,
    index: Mutex<HashMap<String, PathBuf>>,
}

impl ReferenceExecutionEngine {
    pub fn immutable(root: impl Into<PathBuf>) -> Self {
        Self::new(root, true)
    }

    pub fn mutable(root: impl Into<PathBuf>) -> Self {
        Self::new(root, false)
    }

    fn new(root: impl Into<PathBuf>, trust_disk_across_restarts: bool) -> Self {
        Self {
            root: root.into(),
            trust_disk_across_restarts,
            index: Mutex::new(HashMap::new()),
        }
    }

    fn workspace_dir(&self, unique_id: &str) -> PathBuf {
        self.root.join(unique_id)
    }
}

impl ExecutionEngine for ReferenceExecutionEngine {
    fn submit(&self, unit: Box<dyn UnitOfWork>) -> EngineHandle {
        let unique_id = unit.identity().unique_id().as_str().to_string();
        let workspace_dir = self.workspace_dir(&unique_id);
        let workspace = Workspace::at(workspace_dir.clone());

        let seen_this_process = {
            let mut index = self.index.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            let already_seen = index.contains_key(&unique_id);
            index.entry(unique_id).or_insert_with(|| workspace_dir.clone());
            already_seen
        };

        let trust_cache = self.trust_disk_across_restarts || seen_this_process;

        if trust_cache && workspace.results_file().is_file() {
            match unit.load_restored_output(&workspace) {
                Ok(outputs) => return EngineHandle::Cached(outputs),
                Err(err) => {
                    tracing::warn!(
                        target = "transform_engine.reference_engine",
                        workspace = %workspace_dir.display(),
                        error = %err,
                        "cached results.bin unreadable, re-executing"
                    );
                }
            }
        }

        EngineHandle::Deferred(Box::new(move || {
            fs::create_dir_all(workspace.transformed_dir())
                .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;
            unit.execute(&workspace, None)
        }))
    }
}

/// Reads normalized paths and content hashes directly off disk. Real
/// normalizer policy (`FileNormalizer`) is host behavior this reference
/// implementation doesn't attempt to reproduce faithfully; it always
/// resolves the path's own string form, which is enough to exercise
/// identity sensitivity in tests.
pub struct DirectFileSystemAccess;

impl FileSystemAccess for DirectFileSystemAccess {
    fn normalized_path(&self, path: &Path, _normalizer: FileNormalizer) -> Snapshot {
        Snapshot::from_str(&path.to_string_lossy())
    }

    fn content_snapshot(&self, path: &Path) -> Snapshot {
        let digest = match fs::metadata(path) {
            Ok(metadata) if metadata.is_dir() => hash_directory_listing(path),
            Ok(_) => fs::read(path).map(HashDigest::from_bytes).unwrap_or_else(|_| HashDigest::from_bytes(b"")),
            Err(_) => HashDigest::from_bytes(b""),
        };
        Snapshot::from_bytes(digest.as_str().as_bytes())
    }
}

/// Shallow (non-recursive) hash of a directory's immediate entry names,
/// sorted for determinism. A real fingerprinter walks the full tree; this
/// reference implementation only needs to distinguish directories in tests.
fn hash_directory_listing(path: &Path) -> HashDigest {
    let mut names: Vec<String> = fs::read_dir(path)
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    HashDigest::from_bytes(names.join("\n").as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::immutable::ImmutableTransformerExecution;
    use crate::mutable::MutableTransformerExecution;
    use crate::transformer::{InputChanges, Transformer};
    use crate::visitor::DirectorySensitivity;
    use std::path::PathBuf;
    use std::sync::Arc;
    use transform_model::ArtifactTransformDependencies;

    struct Unzip;

    impl Transformer for Unzip {
        fn display_name(&self) -> &str {
            "Unzip"
        }
        fn implementation_class(&self) -> &str {
            "example.Unzip"
        }
        fn secondary_input_hash(&self) -> HashDigest {
            HashDigest::from_bytes([0xAA])
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
            input_artifact: &Path,
            output_dir: &Path,
            _dependencies: &ArtifactTransformDependencies,
            _changes: Option<&InputChanges>,
        ) -> std::result::Result<Vec<PathBuf>, Box<dyn std::error::Error + Send + Sync>> {
            let _ = input_artifact;
            let out = output_dir.join("lib.class");
            fs::write(&out, b"class bytes")?;
            Ok(vec![out])
        }
    }

    #[test]
    fn cold_cache_miss_then_second_submit_is_a_cache_hit() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("lib.jar");
        fs::write(&input, b"jar bytes").unwrap();

        let engine = ReferenceExecutionEngine::immutable(tmp.path().join("workspaces"));
        let fs_access: Arc<dyn FileSystemAccess> = Arc::new(DirectFileSystemAccess);
        let transformer: Arc<dyn Transformer> = Arc::new(Unzip);

        let build_unit = || -> Box<dyn UnitOfWork> {
            Box::new(ImmutableTransformerExecution::new(
                Arc::clone(&transformer),
                Arc::clone(&fs_access),
                input.clone(),
                ArtifactTransformDependencies::empty(),
            ))
        };

        let first = engine.submit(build_unit());
        let outputs = match first {
            EngineHandle::Deferred(run) => run().expect("first execution succeeds"),
            EngineHandle::Cached(_) => panic!("expected a cold-cache miss"),
        };
        assert_eq!(outputs.len(), 1);
        assert!(outputs[0].ends_with("lib.class"));

        let second = engine.submit(build_unit());
        match second {
            EngineHandle::Cached(outputs) => assert_eq!(outputs.len(), 1),
            EngineHandle::Deferred(_) => panic!("expected a cache hit on the second submit"),
        }
    }

    #[test]
    fn mutable_engine_ignores_disk_leftovers_from_a_prior_process() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("a.o");
        fs::write(&input, b"object bytes").unwrap();

        let fs_access: Arc<dyn FileSystemAccess> = Arc::new(DirectFileSystemAccess);
        let transformer: Arc<dyn Transformer> = Arc::new(Unzip);
        let workspaces_root = tmp.path().join("workspaces");

        let build_unit = || -> Box<dyn UnitOfWork> {
            Box::new(MutableTransformerExecution::new(
                Arc::clone(&transformer),
                Arc::clone(&fs_access),
                input.clone(),
                ArtifactTransformDependencies::empty(),
            ))
        };

        // A prior process run populated results.bin on disk for this identity.
        {
            let prior_process_engine = ReferenceExecutionEngine::mutable(&workspaces_root);
            match prior_process_engine.submit(build_unit()) {
                EngineHandle::Deferred(run) => {
                    run().expect("prior process execution succeeds");
                }
                EngineHandle::Cached(_) => panic!("expected a cold-cache miss"),
            }
        }

        // A fresh process (fresh index) must not trust that leftover file.
        let fresh_process_engine = ReferenceExecutionEngine::mutable(&workspaces_root);
        match fresh_process_engine.submit(build_unit()) {
            EngineHandle::Deferred(_) => {}
            EngineHandle::Cached(_) => panic!("mutable engine must not trust disk across process restarts"),
        }
    }

    #[test]
    fn mutable_and_immutable_identities_differ_for_same_path() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("a.o");
        fs::write(&input, b"object bytes").unwrap();

        let fs_access: Arc<dyn FileSystemAccess> = Arc::new(DirectFileSystemAccess);
        let transformer: Arc<dyn Transformer> = Arc::new(Unzip);

        let immutable = ImmutableTransformerExecution::new(
            Arc::clone(&transformer),
            Arc::clone(&fs_access),
            input.clone(),
            ArtifactTransformDependencies::empty(),
        );
        let mutable = MutableTransformerExecution::new(
            Arc::clone(&transformer),
            Arc::clone(&fs_access),
            input,
            ArtifactTransformDependencies::empty(),
        );

        assert_ne!(immutable.identity().unique_id(), mutable.identity().unique_id());
    }
}
