use std::path::PathBuf;

/// Errors surfaced by the transform invocation factory and its execution
/// units.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// User-visible: the transformer itself (or the engine running it)
    /// failed. `display_name` is the execution unit's display name, not the
    /// transformer's class name, to match the `"<displayName> <basename>"`
    /// naming used for the build-operation span.
    #[error("Execution failed for {display_name}.")]
    Execution {
        display_name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Programmer error: the results-file codec was asked to encode an
    /// output file outside both the output directory and the input
    /// artifact.
    #[error("Invalid result path: {}", .0.display())]
    InvalidResultPath(PathBuf),

    /// Programmer error: a line in `results.bin` didn't start with `i/` or
    /// `o/`.
    #[error("Cannot parse result path string: {0}")]
    UnparseableResultLine(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransformError>;
