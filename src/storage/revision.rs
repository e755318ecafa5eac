//! The read-only query interface every revision store implements.
//!
//! Paths handed to a [`Revision`] are absolute forward-slash paths as
//! produced by [`crate::browse::path::compose`]: `/` is the store root and
//! `/a/b` names the entry `b` inside directory `a`.

use indexmap::IndexMap;

use crate::storage::error::StorageResult;
use crate::storage::types::{DirectoryEntry, FileEntry, RevisionNumber};

/// One immutable snapshot of a versioned file tree.
pub trait Revision {
    /// the number this snapshot is addressed by
    fn revision_number(&self) -> RevisionNumber;

    /// check whether anything exists at `path`
    fn path_exists(&self, path: &str) -> StorageResult<bool>;

    /// files directly under `path`, in backend order
    fn files_at_path(&self, path: &str) -> StorageResult<IndexMap<String, FileEntry>>;

    /// directories directly under `path`, in backend order
    fn directories_at_path(&self, path: &str) -> StorageResult<IndexMap<String, DirectoryEntry>>;

    /// Metadata of the directory `name` inside `parent`.
    ///
    /// Backends able to answer this directly should override it. The
    /// default relists `parent` and picks the entry out of it.
    fn directory_metadata(&self, parent: &str, name: &str) -> StorageResult<Option<DirectoryEntry>> {
        let mut directories = self.directories_at_path(parent)?;
        Ok(directories.shift_remove(name))
    }
}

impl<R: Revision + ?Sized> Revision for &R {
    fn revision_number(&self) -> RevisionNumber {
        (**self).revision_number()
    }

    fn path_exists(&self, path: &str) -> StorageResult<bool> {
        (**self).path_exists(path)
    }

    fn files_at_path(&self, path: &str) -> StorageResult<IndexMap<String, FileEntry>> {
        (**self).files_at_path(path)
    }

    fn directories_at_path(&self, path: &str) -> StorageResult<IndexMap<String, DirectoryEntry>> {
        (**self).directories_at_path(path)
    }

    fn directory_metadata(&self, parent: &str, name: &str) -> StorageResult<Option<DirectoryEntry>> {
        (**self).directory_metadata(parent, name)
    }
}
