//! The repository browsing core.
//!
//! Given a [`Revision`](crate::storage::Revision), a configured root folder
//! and a relative path, produce the ordered rows a repository browser shows:
//! an optional "go up" row, then files, then directories, each row carrying
//! its provenance (last change, revision, author) and where it navigates.
//!
//! Nothing here is cached or persisted. Every listing is recomputed from the
//! revision on request.

pub mod binder;
mod error;
pub mod listing;
pub mod path;
pub mod sanitize;

pub use binder::{
    AssignmentId, BindContext, EntryId, GroupingId, ListingRow, NavTarget, RowKind, EXIT_ROW_NAME,
};
pub use error::{BrowseError, BrowseResult, MissingMetadata};
pub use listing::{build_listing, Listing, ListingBuilder, ListingRequest, DEFAULT_BROWSE_ACTION};
pub use sanitize::{NameSanitizer, SanitizerConfig, SanitizerConfigError};
