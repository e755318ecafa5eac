//! Storage layer error types
//!
//! All errors that can occur while querying a revision store are defined here.
//! We use `thiserror` for ergonomic error definition and better error messages

use std::path::PathBuf;

use thiserror::Error;

use crate::storage::types::RevisionNumber;

/// the main error type for storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// error from the underlying Git library
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// the requested revision does not exist on the branch
    #[error("revision not found: {requested} (latest is {latest})")]
    RevisionNotFound {
        requested: RevisionNumber,
        latest: RevisionNumber,
    },

    /// the specified branch/ref was not found
    #[error("ref not found: {0}")]
    RefNotFound(String),

    /// the path is not present at the queried revision
    #[error("path not found: {0}")]
    PathNotFound(String),

    /// repo is not initialized
    #[error("repository not initialized: {0}")]
    NotInitialized(PathBuf),

    /// repo is empty (no commits)
    #[error("repository is empty: no commits found")]
    EmptyRepository,

    /// the commit was not found
    #[error("commit not found: {0}")]
    CommitNotFound(String),

    /// the tree entry has an unexpected type
    #[error("unexpected entry type at {path}: expected {expected}, found {found}")]
    UnexpectedEntryType {
        path: String,
        expected: String,
        found: String,
    },

    /// a non-git backend failed to answer a query
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    /// check if this error indicates the resource doesn't exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::RevisionNotFound { .. }
                | StorageError::RefNotFound(_)
                | StorageError::PathNotFound(_)
                | StorageError::CommitNotFound(_)
                | StorageError::EmptyRepository
        )
    }
}

/// result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let missing = StorageError::RevisionNotFound {
            requested: RevisionNumber::new(9),
            latest: RevisionNumber::new(3),
        };
        assert!(missing.is_not_found());
        assert_eq!(missing.to_string(), "revision not found: 9 (latest is 3)");

        let unavailable = StorageError::Unavailable("timeout".to_string());
        assert!(!unavailable.is_not_found());
    }
}
