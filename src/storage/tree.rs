//!  tree operations for directory browsing.
//!
//! in Git, a tree is a directory. A revision's root tree is the store root
//! `/`, and every absolute browse path maps onto a tree path below it.
//!
//! this module provides read-only abstractions over Git's trees plus the
//! history scan that attributes each entry to the commit that last touched it.

use std::path::Path;

use git2::{ObjectType, Oid, Repository, Tree};

use crate::storage::commit;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::types::CommitId;

/// A read only handle to a git tree at a specific commit
///
/// think of it as a snapshot - it won't change even if new commits are made.
#[derive(Debug)]
pub struct TreeHandle<'repo> {
    tree: Tree<'repo>,
}

/// one direct child of a tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeChild {
    pub name: String,
    pub id: Oid,
}

impl<'repo> TreeHandle<'repo> {
    /// create a TreeHandle from a git2::Tree
    pub(crate) fn new(tree: Tree<'repo>) -> Self {
        Self { tree }
    }

    /// kind of the entry at an absolute browse path, if present
    ///
    /// the root is always a tree
    pub fn kind_at(&self, path: &str) -> Option<ObjectType> {
        match tree_path(path) {
            None => Some(ObjectType::Tree),
            Some(rel) => self
                .tree
                .get_path(Path::new(&rel))
                .ok()
                .and_then(|entry| entry.kind()),
        }
    }

    /// get the subtree at an absolute browse path
    ///
    /// `Ok(None)` if nothing exists there, an error if it is not a directory
    pub fn subtree(&self, repo: &'repo Repository, path: &str) -> StorageResult<Option<TreeHandle<'repo>>> {
        let rel = match tree_path(path) {
            None => return Ok(Some(TreeHandle::new(self.tree.clone()))),
            Some(rel) => rel,
        };

        let entry = match self.tree.get_path(Path::new(&rel)) {
            Ok(entry) => entry,
            Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::Git(e)),
        };

        if entry.kind() != Some(ObjectType::Tree) {
            return Err(StorageError::UnexpectedEntryType {
                path: path.to_string(),
                expected: "tree (directory)".to_string(),
                found: format!("{:?}", entry.kind()),
            });
        }

        let tree = repo.find_tree(entry.id())?;
        Ok(Some(TreeHandle::new(tree)))
    }

    /// direct children of the given kind, in git's tree order
    pub fn children(&self, kind: ObjectType) -> Vec<TreeChild> {
        self.tree
            .iter()
            .filter(|entry| entry.kind() == Some(kind))
            .filter_map(|entry| {
                let name = entry.name()?;
                Some(TreeChild {
                    name: name.to_string(),
                    id: entry.id(),
                })
            })
            .collect()
    }

    /// object id of a direct child by name
    pub fn child_id(&self, name: &str) -> Option<Oid> {
        self.tree.get_name(name).map(|entry| entry.id())
    }
}

/// Find the revision that last modified each of `entries`.
///
/// `entries` are the `(name, object id)` pairs found in directory `dir` at
/// `chain[upto]`. The scan walks the chain backwards and attributes an entry
/// to the first commit whose first parent holds a different object under the
/// same name. The returned indexes are positions in `chain`, one per entry.
pub fn last_modifications(
    repo: &Repository,
    chain: &[CommitId],
    upto: usize,
    dir: &str,
    entries: &[(String, Oid)],
) -> StorageResult<Vec<usize>> {
    let mut found: Vec<Option<usize>> = vec![None; entries.len()];
    let mut pending = entries.len();
    let mut index = upto;

    while pending > 0 {
        if index == 0 {
            for slot in found.iter_mut().filter(|slot| slot.is_none()) {
                *slot = Some(0);
            }
            break;
        }

        let parent_tree = commit::get_tree_at_commit(repo, chain[index - 1])?;
        let parent_dir = match parent_tree.subtree(repo, dir) {
            Ok(dir) => dir,
            // the directory was a file back then
            Err(StorageError::UnexpectedEntryType { .. }) => None,
            Err(e) => return Err(e),
        };

        for (slot, (name, id)) in found.iter_mut().zip(entries) {
            if slot.is_some() {
                continue;
            }
            let previous = parent_dir.as_ref().and_then(|tree| tree.child_id(name));
            if previous != Some(*id) {
                *slot = Some(index);
                pending -= 1;
            }
        }

        index -= 1;
    }

    Ok(found.into_iter().map(|slot| slot.unwrap_or(0)).collect())
}

/// convert an absolute browse path to a path inside the root tree
///
/// returns None for the root itself
pub(crate) fn tree_path(path: &str) -> Option<String> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}
