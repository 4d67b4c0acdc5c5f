//! Transformer invocation factory and execution units for artifact-transform
//! caching: identity computation, input declaration, output recording, and
//! the immutable/mutable execution variants.
//!
//! The host build tool's execution engine, file-system snapshotter,
//! build-operation tracer and listener bus are external collaborators,
//! consumed here only through the traits in [`workspace`], [`fs_access`]
//! and [`listener`].

pub mod execution;
pub mod factory;
pub mod fs_access;
pub mod immutable;
pub mod listener;
pub mod mutable;
pub mod results;
pub mod transformer;
pub mod visitor;
pub mod workspace;

#[cfg(any(test, feature = "test-support"))]
pub mod engine;

pub use execution::BaseExecution;
pub use factory::{Invocation, InvocationFactory};
pub use fs_access::FileSystemAccess;
pub use immutable::ImmutableTransformerExecution;
pub use listener::{InvocationSpan, TransformerInvocationListener};
pub use mutable::MutableTransformerExecution;
pub use transformer::{InputChanges, Transformer};
pub use workspace::{CachingDisabledReason, EngineHandle, ExecutionEngine, IncrementalBehavior, UnitOfWork, Workspace};
