//! The file-system snapshotter/fingerprinter: an external collaborator,
//! consumed through `FileSystemAccess`.
//!
//! Supplies normalized paths and content hashes on request. Production
//! hosts back this with a real, cached snapshotting layer; this crate only
//! defines the seam and, behind `test-support`, a minimal direct-read
//! implementation for tests (see `engine::DirectFileSystemAccess`).

use std::path::Path;

use transform_model::Snapshot;

use crate::visitor::FileNormalizer;

pub trait FileSystemAccess: Send + Sync {
    /// A snapshot of `path`'s normalized path under `normalizer`.
    fn normalized_path(&self, path: &Path, normalizer: FileNormalizer) -> Snapshot;

    /// A snapshot of `path`'s content (root content hash for a directory).
    fn content_snapshot(&self, path: &Path) -> Snapshot;
}
