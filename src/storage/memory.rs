//! An in-memory [`Revision`], intended primarily for testing and for
//! embedders that already hold a snapshot in memory.

use std::sync::atomic::{AtomicUsize, Ordering};

use indexmap::IndexMap;

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::revision::Revision;
use crate::storage::types::{DirectoryEntry, FileEntry, RevisionNumber};

/// The queries a [`MemoryRevision`] counts and can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Query {
    PathExists,
    Files,
    Directories,
}

/// Number of times each query has been answered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryCounts {
    pub path_exists: usize,
    pub files: usize,
    pub directories: usize,
}

#[derive(Debug, Default, Clone)]
struct MemoryDirectory {
    files: IndexMap<String, FileEntry>,
    directories: IndexMap<String, DirectoryEntry>,
}

/// A snapshot kept entirely in memory.
///
/// Entries are listed in insertion order. Inserting an entry below a
/// directory that was never inserted itself is allowed; such a directory
/// answers listings but does not exist as far as `path_exists` goes.
#[derive(Debug)]
pub struct MemoryRevision {
    number: RevisionNumber,
    directories: IndexMap<String, MemoryDirectory>,
    failing: Vec<Query>,
    path_exists_calls: AtomicUsize,
    files_calls: AtomicUsize,
    directories_calls: AtomicUsize,
}

impl MemoryRevision {
    /// Create an empty snapshot containing only the root.
    pub fn new(number: impl Into<RevisionNumber>) -> Self {
        let mut directories = IndexMap::new();
        directories.insert("/".to_string(), MemoryDirectory::default());
        Self {
            number: number.into(),
            directories,
            failing: Vec::new(),
            path_exists_calls: AtomicUsize::new(0),
            files_calls: AtomicUsize::new(0),
            directories_calls: AtomicUsize::new(0),
        }
    }

    /// Add a directory under `parent`. The entry's name is its key.
    pub fn with_directory(mut self, parent: &str, entry: DirectoryEntry) -> Self {
        let parent = normalize(parent);
        let child = join(&parent, &entry.name);
        self.directories.entry(child).or_default();
        self.directories
            .entry(parent)
            .or_default()
            .directories
            .insert(entry.name.clone(), entry);
        self
    }

    /// Add a file under `parent`. The entry's name is its key.
    pub fn with_file(mut self, parent: &str, entry: FileEntry) -> Self {
        self.directories
            .entry(normalize(parent))
            .or_default()
            .files
            .insert(entry.name.clone(), entry);
        self
    }

    /// Make every subsequent `query` fail with [`StorageError::Unavailable`].
    pub fn failing(mut self, query: Query) -> Self {
        self.failing.push(query);
        self
    }

    /// How often each query has been answered so far.
    pub fn query_counts(&self) -> QueryCounts {
        QueryCounts {
            path_exists: self.path_exists_calls.load(Ordering::Relaxed),
            files: self.files_calls.load(Ordering::Relaxed),
            directories: self.directories_calls.load(Ordering::Relaxed),
        }
    }

    fn record(&self, query: Query) -> StorageResult<()> {
        let counter = match query {
            Query::PathExists => &self.path_exists_calls,
            Query::Files => &self.files_calls,
            Query::Directories => &self.directories_calls,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        if self.failing.contains(&query) {
            return Err(StorageError::Unavailable(format!("{:?} query failed", query)));
        }
        Ok(())
    }
}

impl Revision for MemoryRevision {
    fn revision_number(&self) -> RevisionNumber {
        self.number
    }

    fn path_exists(&self, path: &str) -> StorageResult<bool> {
        self.record(Query::PathExists)?;

        let path = normalize(path);
        if path == "/" {
            return Ok(true);
        }
        let (parent, name) = match path.rsplit_once('/') {
            Some(("", name)) => ("/", name),
            Some((parent, name)) => (parent, name),
            None => return Ok(false),
        };
        Ok(self
            .directories
            .get(parent)
            .map(|dir| dir.files.contains_key(name) || dir.directories.contains_key(name))
            .unwrap_or(false))
    }

    fn files_at_path(&self, path: &str) -> StorageResult<IndexMap<String, FileEntry>> {
        self.record(Query::Files)?;
        Ok(self
            .directories
            .get(&normalize(path))
            .map(|dir| dir.files.clone())
            .unwrap_or_default())
    }

    fn directories_at_path(&self, path: &str) -> StorageResult<IndexMap<String, DirectoryEntry>> {
        self.record(Query::Directories)?;
        Ok(self
            .directories
            .get(&normalize(path))
            .map(|dir| dir.directories.clone())
            .unwrap_or_default())
    }
}

fn normalize(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

fn join(parent: &str, name: &str) -> String {
    if parent == "/" {
        format!("/{}", name)
    } else {
        format!("{}/{}", parent, name)
    }
}
