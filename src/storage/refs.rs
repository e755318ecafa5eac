//!  Branch and reference resolution.
//!
//!  The browser only ever reads refs: a branch name picks which first-parent
//!  history the revision numbers are counted along.

use git2::Repository;

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::types::{BranchName, CommitId};

/// Resolves Git references (branches).
pub struct RefManager;

impl RefManager {
    /// Resolve a branch name to its current commit ID.
    pub fn resolve_branch(repo: &Repository, branch: &BranchName) -> StorageResult<CommitId> {
        let reference = repo
            .find_reference(&branch.as_ref_path())
            .map_err(|_| StorageError::RefNotFound(branch.to_string()))?;

        let commit = reference
            .peel_to_commit()
            .map_err(|_| StorageError::RefNotFound(branch.to_string()))?;

        Ok(CommitId::new(commit.id()))
    }

    /// Resolve the tip of `branch`.
    ///
    /// An empty repository reports `EmptyRepository` rather than a missing ref.
    pub fn branch_tip(repo: &Repository, branch: &BranchName) -> StorageResult<CommitId> {
        if repo.is_empty()? {
            return Err(StorageError::EmptyRepository);
        }
        Self::resolve_branch(repo, branch)
    }
}
