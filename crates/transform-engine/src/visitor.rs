use transform_model::Snapshot;

/// Property names are part of the external contract: fingerprints are keyed
/// on them, so they must never change.
pub mod property_names {
    pub const INPUT_ARTIFACT: &str = "inputArtifact";
    pub const INPUT_ARTIFACT_PATH: &str = "inputArtifactPath";
    pub const INPUT_ARTIFACT_SNAPSHOT: &str = "inputArtifactSnapshot";
    pub const INPUT_ARTIFACT_DEPENDENCIES: &str = "inputArtifactDependencies";
    pub const INPUT_PROPERTIES_HASH: &str = "inputPropertiesHash";
    pub const OUTPUT_DIRECTORY: &str = "outputDirectory";
    pub const RESULTS_FILE: &str = "resultsFile";
}

/// A zero-argument closure the engine invokes only if (and when) it decides
/// to fingerprint this property.
pub type LazySnapshot<'a> = &'a dyn Fn() -> Snapshot;

/// Tree kind used when declaring file-typed inputs/outputs. Identity file
/// inputs always use `NonIncremental`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilePropertyKind {
    File,
    Directory,
    NonIncremental,
}

/// Policy describing which aspects of a file tree contribute to its
/// fingerprint. Concrete normalization is the file-system snapshotter's job
/// (an external collaborator); this crate only carries the transformer's
/// declared policy through to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileNormalizer {
    AbsolutePath,
    RelativePath,
    NameOnly,
    Ignored,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirectorySensitivity {
    Default,
    IgnoreEmptyDirectories,
}

/// Callback surface a unit of work uses to declare the inputs that
/// participate in Identity.
pub trait IdentityInputVisitor {
    fn input_property(&mut self, name: &'static str, value: LazySnapshot<'_>);

    fn input_file_property(
        &mut self,
        name: &'static str,
        kind: FilePropertyKind,
        value: LazySnapshot<'_>,
    );
}

/// Callback surface for inputs that may trigger re-execution but don't
/// affect Identity.
pub trait RegularInputVisitor {
    fn input_file_property(
        &mut self,
        name: &'static str,
        normalizer: FileNormalizer,
        sensitivity: DirectorySensitivity,
        value: LazySnapshot<'_>,
    );
}

/// Callback surface for declaring outputs.
pub trait OutputVisitor {
    fn output_directory(&mut self, name: &'static str, path: &std::path::Path);
    fn output_file(&mut self, name: &'static str, path: &std::path::Path);
}
