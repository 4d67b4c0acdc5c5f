use std::path::{Path, PathBuf};

use transform_model::{Identity, Result};

/// Raw, unwrapped outcome of actually running a unit of work. Wrapping the
/// error side into `TransformError::Execution` is the invocation factory's
/// job, so the engine and the unit of work pass it through as-is.
pub type RawExecuteResult = std::result::Result<Vec<PathBuf>, Box<dyn std::error::Error + Send + Sync>>;

use crate::transformer::InputChanges;
use crate::visitor::{IdentityInputVisitor, OutputVisitor, RegularInputVisitor};

/// A directory allocated by the host engine, scoped to a single [`Identity`].
///
/// Layout is fixed and stable across versions:
/// ```text
/// <workspace>/
///   transformed/      output directory the transformer writes into
///   results.bin        UTF-8 output manifest
/// ```
#[derive(Clone, Debug)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Wraps an already-allocated directory. Does not create it; the engine
    /// owns allocation and holds the workspace exclusively for the duration
    /// of `execute()`.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn transformed_dir(&self) -> PathBuf {
        self.root.join("transformed")
    }

    pub fn results_file(&self) -> PathBuf {
        self.root.join("results.bin")
    }
}

/// Why caching is disabled for a unit of work, or that it isn't.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CachingDisabledReason {
    Enabled,
    Disabled {
        category: &'static str,
        message: &'static str,
    },
}

impl CachingDisabledReason {
    pub fn not_cacheable() -> Self {
        Self::Disabled {
            category: "not-cacheable",
            message: "Caching not enabled.",
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled)
    }
}

/// Incremental tracking strategy advertised by a unit of work.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IncrementalBehavior {
    None,
    IncrementalParameters,
}

/// The unit-of-work contract the host execution engine drives.
///
/// Object-safe by construction (no generic methods) so the engine can hold
/// `&dyn UnitOfWork` / `Box<dyn UnitOfWork>` without knowing the concrete
/// execution variant.
pub trait UnitOfWork: Send + Sync {
    /// `"<transformer.displayName> <inputArtifact.basename>"`. Computed, not
    /// cached — cheap enough to call on demand (error messages,
    /// build-operation span names).
    fn display_name(&self) -> String;

    fn identity(&self) -> Identity;

    fn visit_identity_inputs(&self, visitor: &mut dyn IdentityInputVisitor);
    fn visit_regular_inputs(&self, visitor: &mut dyn RegularInputVisitor);
    fn visit_outputs(&self, workspace: &Workspace, visitor: &mut dyn OutputVisitor);

    fn should_disable_caching(&self) -> CachingDisabledReason;
    fn incremental_behavior(&self) -> IncrementalBehavior;

    /// Always absent at this layer.
    fn timeout(&self) -> Option<std::time::Duration> {
        None
    }

    /// Wall-clock time since this unit was constructed.
    fn execution_time(&self) -> std::time::Duration;

    /// Runs the transformer and encodes `results.bin`. Returns the raw
    /// output list on success; on failure returns the *unwrapped* cause —
    /// wrapping into `TransformError::Execution` is the invocation
    /// factory's job, not this method's.
    fn execute(&self, workspace: &Workspace, changes: Option<&InputChanges>) -> RawExecuteResult;

    /// Decodes a previously-written `results.bin`.
    fn load_restored_output(&self, workspace: &Workspace) -> Result<Vec<PathBuf>>;
}

/// The host execution engine this core submits units of work to; out of
/// scope for this crate, consumed only through this trait.
///
/// Owns scheduling, identity-cache lookup, workspace allocation and mutual
/// exclusion per identity; this crate supplies only the unit of work.
pub trait ExecutionEngine: Send + Sync {
    fn submit(&self, unit: Box<dyn UnitOfWork>) -> EngineHandle;
}

/// What submitting a unit of work yields: a deferred-execution handle.
pub enum EngineHandle {
    /// A previously-successful execution already produced this identity's
    /// outputs; they were loaded via `load_restored_output`. No listener
    /// events fire for this case.
    Cached(Vec<PathBuf>),
    /// The engine had no usable cache entry: forcing this thunk allocates
    /// (or reuses) a workspace and calls `execute()`. Kept lazy so a caller
    /// that never needs the result never pays for it. Unwrapped — the
    /// invocation factory remaps the error side.
    Deferred(Box<dyn FnOnce() -> RawExecuteResult + Send>),
}
