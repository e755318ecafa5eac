//! storage layer for revbrowse
//!
//! this module defines the read-only [`Revision`] interface the browsing
//! core queries, plus the stores that implement it. The browsing core only
//! sees the trait and never touches git2 directly.
//!
//!  # Architecture
//!
//! ```text
//!                ┌──────────────────────────────┐
//!                │       trait Revision         │
//!                │ path_exists / files / dirs   │
//!                └──────────────────────────────┘
//!                        ▲               ▲
//!                        │               │
//!             ┌──────────────────┐  ┌──────────────────┐
//!             │   GitRevision    │  │  MemoryRevision  │
//!             │ (numbered commit)│  │   (in memory)    │
//!             └──────────────────┘  └──────────────────┘
//!                        │
//!        ┌───────────────┼───────────────┐
//!        ▼               ▼               ▼
//!  ┌───────────┐   ┌───────────┐   ┌───────────┐
//!  │   tree    │   │  commit   │   │   refs    │
//!  │ (listing) │   │ (history) │   │ (branches)│
//!  └───────────┘   └───────────┘   └───────────┘
//!  ```
//!
//! # Usage
//!
//! ```ignore
//! use revbrowse::storage::{GitStore, Revision, RevisionNumber};
//!
//! let store = GitStore::open("./submissions/group_0001")?;
//! let revision = store.revision(RevisionNumber::new(3))?;
//!
//! if revision.path_exists("/A1")? {
//!     for (name, file) in revision.files_at_path("/A1")? {
//!         println!("{} r{} by {}", name, file.last_modified_revision, file.user_id);
//!     }
//! }
//! ```

mod commit;
mod error;
mod memory;
mod refs;
mod repository;
mod revision;
mod tree;
mod types;

#[cfg(test)]
pub(crate) mod fixture;

// Re-export public API
pub use commit::CommitInfo;
pub use error::{StorageError, StorageResult};
pub use memory::{MemoryRevision, Query, QueryCounts};
pub use repository::{GitRevision, GitStore};
pub use revision::Revision;
pub use types::{
    BranchName, CommitId, ContentHandle, DirectoryEntry, FileEntry, InvalidNameError,
    RevisionNumber,
};
