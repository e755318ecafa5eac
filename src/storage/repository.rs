//!   Git-backed revision store.
//!
//!  This wraps `git2::Repository` with thread-safe access and exposes each
//!  commit of a branch's first-parent history as a numbered [`Revision`].
//!
//! All other storage modules are reached through this one for Git access.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use git2::{ObjectType, Oid, Repository};
use indexmap::IndexMap;
use parking_lot::Mutex;
use tracing::debug;

use crate::storage::commit::{self, CommitInfo};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::refs::RefManager;
use crate::storage::revision::Revision;
use crate::storage::tree::{self, TreeChild};
use crate::storage::types::{
    BranchName, CommitId, ContentHandle, DirectoryEntry, FileEntry, RevisionNumber,
};

/// The git-backed revision store.
///
/// Clone this to share across threads - it uses Arc internally.
#[derive(Clone)]
pub struct GitStore {
    inner: Arc<GitStoreInner>,
    branch: BranchName,
}

struct GitStoreInner {
    repo: Mutex<Repository>,
    path: PathBuf,
}

impl GitStore {
    /// Open an existing repository, browsing its `main` branch.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        let repo = Repository::open(path).map_err(|_| StorageError::NotInitialized(path.to_path_buf()))?;
        debug!(path = %path.display(), "opened repository");

        Ok(Self {
            inner: Arc::new(GitStoreInner {
                repo: Mutex::new(repo),
                path: path.to_path_buf(),
            }),
            branch: BranchName::main(),
        })
    }

    /// Browse a different branch.
    pub fn with_branch(mut self, branch: BranchName) -> Self {
        self.branch = branch;
        self
    }

    /// Get the repository path.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// The branch revisions are numbered along.
    pub fn branch(&self) -> &BranchName {
        &self.branch
    }

    /// Execute a function with access to the repository.
    pub fn with_repo<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&Repository) -> StorageResult<T>,
    {
        let repo = self.inner.repo.lock();
        f(&repo)
    }

    // ==================== Revisions ====================

    fn chain(&self, repo: &Repository) -> StorageResult<Vec<CommitId>> {
        let tip = RefManager::branch_tip(repo, &self.branch)?;
        commit::revision_chain(repo, tip)
    }

    /// Number of revisions on the branch.
    pub fn revision_count(&self) -> StorageResult<u64> {
        self.with_repo(|repo| Ok(self.chain(repo)?.len() as u64))
    }

    /// The newest revision on the branch.
    pub fn latest_revision(&self) -> StorageResult<GitRevision> {
        let chain = self.with_repo(|repo| self.chain(repo))?;
        if chain.is_empty() {
            return Err(StorageError::EmptyRepository);
        }
        let number = RevisionNumber::from_chain_index(chain.len() - 1);
        Ok(GitRevision::new(self.clone(), number, chain))
    }

    /// A specific revision on the branch.
    pub fn revision(&self, number: RevisionNumber) -> StorageResult<GitRevision> {
        let mut chain = self.with_repo(|repo| self.chain(repo))?;
        let latest = RevisionNumber::new(chain.len() as u64);

        let index = match number.chain_index() {
            Some(index) if index < chain.len() => index,
            _ => {
                return Err(StorageError::RevisionNotFound {
                    requested: number,
                    latest,
                })
            }
        };

        chain.truncate(index + 1);
        Ok(GitRevision::new(self.clone(), number, chain))
    }

    /// First-parent history of the branch, newest first.
    pub fn history(&self, limit: Option<usize>) -> StorageResult<Vec<CommitInfo>> {
        self.with_repo(|repo| {
            let tip = RefManager::branch_tip(repo, &self.branch)?;
            let iter = commit::history(repo, tip)?;
            match limit {
                Some(n) => iter.take(n).collect(),
                None => iter.collect(),
            }
        })
    }
}

impl std::fmt::Debug for GitStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitStore")
            .field("path", &self.inner.path)
            .field("branch", &self.branch)
            .finish()
    }
}

/// One numbered commit of a [`GitStore`].
#[derive(Debug, Clone)]
pub struct GitRevision {
    store: GitStore,
    number: RevisionNumber,
    /// first-parent chain, oldest first, ending at this revision
    chain: Arc<[CommitId]>,
}

/// an entry found in a listing together with the commit that last touched it
struct Attributed {
    child: TreeChild,
    info: CommitInfo,
    revision: RevisionNumber,
}

impl GitRevision {
    fn new(store: GitStore, number: RevisionNumber, chain: Vec<CommitId>) -> Self {
        Self {
            store,
            number,
            chain: chain.into(),
        }
    }

    fn tip_index(&self) -> usize {
        self.chain.len() - 1
    }

    /// The commit this revision points at.
    pub fn commit_id(&self) -> CommitId {
        self.chain[self.tip_index()]
    }

    /// list the children of `path` of one kind and attribute each of them
    fn attributed_children(&self, path: &str, kind: ObjectType) -> StorageResult<Vec<Attributed>> {
        self.store.with_repo(|repo| {
            let root = commit::get_tree_at_commit(repo, self.commit_id())?;
            let dir = root
                .subtree(repo, path)?
                .ok_or_else(|| StorageError::PathNotFound(path.to_string()))?;

            let children = dir.children(kind);
            let ids: Vec<(String, Oid)> = children.iter().map(|c| (c.name.clone(), c.id)).collect();
            let modified = tree::last_modifications(repo, &self.chain, self.tip_index(), path, &ids)?;

            let mut infos: HashMap<usize, CommitInfo> = HashMap::new();
            let mut attributed = Vec::with_capacity(children.len());
            for (child, index) in children.into_iter().zip(modified) {
                let info = match infos.get(&index) {
                    Some(info) => info.clone(),
                    None => {
                        let info = commit::get_commit(repo, self.chain[index])?;
                        infos.insert(index, info.clone());
                        info
                    }
                };
                attributed.push(Attributed {
                    child,
                    info,
                    revision: RevisionNumber::from_chain_index(index),
                });
            }

            debug!(
                revision = %self.number,
                path,
                kind = ?kind,
                entries = attributed.len(),
                "listed entries"
            );
            Ok(attributed)
        })
    }
}

impl Revision for GitRevision {
    fn revision_number(&self) -> RevisionNumber {
        self.number
    }

    fn path_exists(&self, path: &str) -> StorageResult<bool> {
        self.store.with_repo(|repo| {
            let root = commit::get_tree_at_commit(repo, self.commit_id())?;
            Ok(root.kind_at(path).is_some())
        })
    }

    fn files_at_path(&self, path: &str) -> StorageResult<IndexMap<String, FileEntry>> {
        let files = self
            .attributed_children(path, ObjectType::Blob)?
            .into_iter()
            .map(|a| {
                let entry = FileEntry {
                    name: a.child.name.clone(),
                    user_id: a.info.author_name,
                    last_modified_date: a.info.timestamp,
                    last_modified_revision: a.revision,
                    content: ContentHandle::from(a.child.id),
                };
                (a.child.name, entry)
            })
            .collect();
        Ok(files)
    }

    fn directories_at_path(&self, path: &str) -> StorageResult<IndexMap<String, DirectoryEntry>> {
        let directories = self
            .attributed_children(path, ObjectType::Tree)?
            .into_iter()
            .map(|a| {
                let entry = DirectoryEntry {
                    name: a.child.name.clone(),
                    user_id: a.info.author_name,
                    last_modified_date: a.info.timestamp,
                    last_modified_revision: a.revision,
                };
                (a.child.name, entry)
            })
            .collect();
        Ok(directories)
    }

    /// Looks the directory up directly instead of relisting its parent.
    fn directory_metadata(&self, parent: &str, name: &str) -> StorageResult<Option<DirectoryEntry>> {
        self.store.with_repo(|repo| {
            let root = commit::get_tree_at_commit(repo, self.commit_id())?;
            let dir = match root.subtree(repo, parent) {
                Ok(Some(dir)) => dir,
                Ok(None) | Err(StorageError::UnexpectedEntryType { .. }) => return Ok(None),
                Err(e) => return Err(e),
            };

            let child = dir
                .children(ObjectType::Tree)
                .into_iter()
                .find(|child| child.name == name);
            let child = match child {
                Some(child) => child,
                None => return Ok(None),
            };

            let ids = [(child.name.clone(), child.id)];
            let modified = tree::last_modifications(repo, &self.chain, self.tip_index(), parent, &ids)?;
            let index = modified.first().copied().unwrap_or(0);
            let info = commit::get_commit(repo, self.chain[index])?;

            Ok(Some(DirectoryEntry {
                name: child.name,
                user_id: info.author_name,
                last_modified_date: info.timestamp,
                last_modified_revision: RevisionNumber::from_chain_index(index),
            }))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browse::listing::{build_listing, ListingRequest};
    use crate::storage::fixture::FixtureRepo;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_store_and_revision_are_send_sync() {
        assert_send_sync::<GitStore>();
        assert_send_sync::<GitRevision>();
    }

    #[test]
    fn test_concurrent_listings_agree() {
        let fixture = FixtureRepo::new();
        fixture
            .commit()
            .author("u1")
            .write("sub/a/x.txt", "1")
            .write("sub/a/b/y.txt", "y")
            .commit();
        fixture.commit().author("u2").write("sub/a/x.txt", "2").commit();

        let store = GitStore::open(fixture.path()).unwrap();
        let revision = store.latest_revision().unwrap();
        let request = ListingRequest::new("/sub", "a");

        let first = revision.clone();
        let second = revision.clone();
        let shared = &request;
        let (left, right) = std::thread::scope(|scope| {
            let left = scope.spawn(move || build_listing(&first, shared));
            let right = scope.spawn(move || build_listing(&second, shared));
            (left.join().unwrap().unwrap(), right.join().unwrap().unwrap())
        });

        assert_eq!(left, right);
        let names: Vec<&str> = left.rows().iter().map(|row| row.name.as_str()).collect();
        assert_eq!(names, vec!["x.txt", "b/"]);
        assert_eq!(left.rows()[0].revision_by, "u2");
        assert_eq!(left, build_listing(&revision, &request).unwrap());
    }

    #[test]
    fn test_open_missing_repository() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = GitStore::open(dir.path().join("nope"));
        assert!(matches!(result, Err(StorageError::NotInitialized(_))));
    }

    #[test]
    fn test_revision_numbering() {
        let fixture = FixtureRepo::new();
        let c1 = fixture.commit().write("a.txt", "1").commit();
        let c2 = fixture.commit().write("a.txt", "2").commit();

        let store = GitStore::open(fixture.path()).unwrap();
        assert_eq!(store.revision_count().unwrap(), 2);

        let latest = store.latest_revision().unwrap();
        assert_eq!(latest.revision_number(), RevisionNumber::new(2));
        assert_eq!(latest.commit_id(), c2);

        let first = store.revision(RevisionNumber::FIRST).unwrap();
        assert_eq!(first.commit_id(), c1);

        let result = store.revision(RevisionNumber::new(3));
        assert!(matches!(result, Err(StorageError::RevisionNotFound { .. })));
        assert!(matches!(
            store.revision(RevisionNumber::new(0)),
            Err(StorageError::RevisionNotFound { .. })
        ));
    }

    #[test]
    fn test_empty_repository() {
        let fixture = FixtureRepo::new();
        let store = GitStore::open(fixture.path()).unwrap();
        assert!(matches!(store.latest_revision(), Err(StorageError::EmptyRepository)));
    }

    #[test]
    fn test_path_exists() {
        let fixture = FixtureRepo::new();
        fixture.commit().write("a/b/x.txt", "x").commit();
        fixture.commit().remove("a/b").write("a/y.txt", "y").commit();

        let store = GitStore::open(fixture.path()).unwrap();
        let first = store.revision(RevisionNumber::FIRST).unwrap();
        let latest = store.latest_revision().unwrap();

        assert!(first.path_exists("/").unwrap());
        assert!(first.path_exists("/a/b").unwrap());
        assert!(first.path_exists("/a/b/x.txt").unwrap());
        assert!(!latest.path_exists("/a/b").unwrap());
        assert!(latest.path_exists("/a/y.txt").unwrap());
    }

    #[test]
    fn test_entry_metadata_tracks_last_modifier() {
        let fixture = FixtureRepo::new();
        fixture
            .commit()
            .author("u1")
            .at(1_609_459_200)
            .write("sub/a/old.txt", "o")
            .write("sub/a/keep.txt", "k")
            .commit();
        fixture
            .commit()
            .author("u2")
            .at(1_612_224_000)
            .write("sub/a/old.txt", "changed")
            .commit();
        fixture.commit().author("u3").write("other.txt", "z").commit();

        let store = GitStore::open(fixture.path()).unwrap();
        let latest = store.latest_revision().unwrap();

        let files = latest.files_at_path("/sub/a").unwrap();
        let names: Vec<_> = files.keys().cloned().collect();
        assert_eq!(names, vec!["keep.txt", "old.txt"]);

        let keep = &files["keep.txt"];
        assert_eq!(keep.user_id, "u1");
        assert_eq!(keep.last_modified_revision, RevisionNumber::new(1));
        assert_eq!(keep.last_modified_date.timestamp(), 1_609_459_200);

        let old = &files["old.txt"];
        assert_eq!(old.user_id, "u2");
        assert_eq!(old.last_modified_revision, RevisionNumber::new(2));

        let dirs = latest.directories_at_path("/sub").unwrap();
        assert_eq!(dirs["a"].last_modified_revision, RevisionNumber::new(2));
        assert_eq!(dirs["a"].user_id, "u2");
    }

    #[test]
    fn test_listing_at_older_revision() {
        let fixture = FixtureRepo::new();
        fixture.commit().write("a/one.txt", "1").commit();
        fixture.commit().write("a/two.txt", "2").commit();

        let store = GitStore::open(fixture.path()).unwrap();
        let first = store.revision(RevisionNumber::FIRST).unwrap();
        let files = first.files_at_path("/a").unwrap();
        assert_eq!(files.len(), 1);
        assert!(files.contains_key("one.txt"));
    }

    #[test]
    fn test_listing_errors() {
        let fixture = FixtureRepo::new();
        fixture.commit().write("a/one.txt", "1").commit();

        let store = GitStore::open(fixture.path()).unwrap();
        let latest = store.latest_revision().unwrap();

        assert!(matches!(latest.files_at_path("/nope"), Err(StorageError::PathNotFound(_))));
        assert!(matches!(
            latest.directories_at_path("/a/one.txt"),
            Err(StorageError::UnexpectedEntryType { .. })
        ));
    }

    #[test]
    fn test_direct_directory_metadata() {
        let fixture = FixtureRepo::new();
        fixture.commit().author("u1").write("a/b/x.txt", "x").commit();
        fixture.commit().author("u2").write("a/c/y.txt", "y").commit();

        let store = GitStore::open(fixture.path()).unwrap();
        let latest = store.latest_revision().unwrap();

        let b = latest.directory_metadata("/a", "b").unwrap().unwrap();
        assert_eq!(b.user_id, "u1");
        assert_eq!(b.last_modified_revision, RevisionNumber::new(1));

        let a = latest.directory_metadata("/", "a").unwrap().unwrap();
        assert_eq!(a.user_id, "u2");

        assert!(latest.directory_metadata("/a", "missing").unwrap().is_none());
        assert!(latest.directory_metadata("/missing", "b").unwrap().is_none());
    }

    #[test]
    fn test_branch_selection() {
        let fixture = FixtureRepo::new();
        fixture.commit().write("a.txt", "1").commit();

        let store = GitStore::open(fixture.path())
            .unwrap()
            .with_branch(BranchName::new("feature").unwrap());
        assert_eq!(store.branch().as_str(), "feature");
        assert!(matches!(store.latest_revision(), Err(StorageError::RefNotFound(_))));

        let history = GitStore::open(fixture.path()).unwrap().history(Some(5)).unwrap();
        assert_eq!(history.len(), 1);
    }
}
