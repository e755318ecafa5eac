//! Browsing error types.

use serde::Serialize;
use thiserror::Error;

use crate::storage::StorageError;

/// Result type for browsing operations.
pub type BrowseResult<T> = Result<T, BrowseError>;

/// The departing directory's own entry is missing from its parent listing.
///
/// This means the backend contradicts itself: the directory was browsable a
/// moment ago but its parent does not list it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("no metadata for directory '{name}' in '{parent}'")]
pub struct MissingMetadata {
    /// absolute path of the parent that was searched
    pub parent: String,
    /// name of the directory that was not found
    pub name: String,
}

/// Errors that can occur while building a listing.
#[derive(Debug, Error)]
pub enum BrowseError {
    /// A path tried to leave the configured root folder.
    #[error("path '{path}' rejected: {reason}")]
    PathTraversalRejected { path: String, reason: String },

    /// The exit row could not be attributed.
    #[error(transparent)]
    MissingMetadata(#[from] MissingMetadata),

    /// The revision store failed to answer a query.
    #[error("backend query failed: {0}")]
    Backend(#[from] StorageError),
}

impl BrowseError {
    pub(crate) fn traversal(path: &str, reason: impl Into<String>) -> Self {
        Self::PathTraversalRejected {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    /// Check if the listing can still be shown after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, BrowseError::MissingMetadata(_))
    }
}
