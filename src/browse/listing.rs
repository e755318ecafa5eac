//! Listing assembly.
//!
//! A listing is built fresh on every call:
//!
//! 1. validate the requested and previous paths (no backend access yet)
//! 2. resolve the "go up" row from the departing directory's metadata
//! 3. check that the requested path exists at this revision
//! 4. list files and directories and bind them
//!
//! A path that is missing, or names a file, yields the exit row alone.
//!
//! Rows come out as: exit row, files, directories, each group in backend
//! order.

use serde::Serialize;
use tracing::debug;

use crate::browse::binder::{
    bind_directory, bind_exit, bind_file, AssignmentId, BindContext, GroupingId, ListingRow, RowKind,
};
use crate::browse::error::{BrowseResult, MissingMetadata};
use crate::browse::path::{self, compose, exit_target, normalize_relative};
use crate::storage::{Revision, StorageError};

/// Action directory rows and the exit row navigate with by default.
pub const DEFAULT_BROWSE_ACTION: &str = "repo_browser";

/// Everything needed to list one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRequest {
    pub root_folder: String,
    pub relative_path: String,
    pub previous_path: String,
    pub grouping_id: GroupingId,
    pub assignment_id: AssignmentId,
    pub action: String,
}

impl ListingRequest {
    /// Request a listing of `relative_path` under `root_folder`.
    ///
    /// The previous path defaults to the parent of `relative_path`.
    pub fn new(root_folder: impl Into<String>, relative_path: impl Into<String>) -> Self {
        let relative_path = relative_path.into();
        let previous_path = path::split(&relative_path).0.to_string();
        Self {
            root_folder: root_folder.into(),
            relative_path,
            previous_path,
            grouping_id: 0,
            assignment_id: 0,
            action: DEFAULT_BROWSE_ACTION.to_string(),
        }
    }

    pub fn previous_path(mut self, previous_path: impl Into<String>) -> Self {
        self.previous_path = previous_path.into();
        self
    }

    pub fn grouping(mut self, grouping_id: GroupingId) -> Self {
        self.grouping_id = grouping_id;
        self
    }

    pub fn assignment(mut self, assignment_id: AssignmentId) -> Self {
        self.assignment_id = assignment_id;
        self
    }

    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }
}

/// The ordered rows of one directory at one revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    rows: Vec<ListingRow>,
    /// set when the exit row had to be dropped
    #[serde(skip_serializing_if = "Option::is_none")]
    missing_metadata: Option<MissingMetadata>,
}

impl Listing {
    pub fn rows(&self) -> &[ListingRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn exit_row(&self) -> Option<&ListingRow> {
        self.rows.first().filter(|row| row.kind == RowKind::Exit)
    }

    /// The recoverable error hit while building the exit row, if any.
    pub fn missing_metadata(&self) -> Option<&MissingMetadata> {
        self.missing_metadata.as_ref()
    }
}

/// Builds listings against one revision.
pub struct ListingBuilder<'r, R: Revision + ?Sized> {
    revision: &'r R,
}

impl<'r, R: Revision + ?Sized> ListingBuilder<'r, R> {
    pub fn new(revision: &'r R) -> Self {
        Self { revision }
    }

    pub fn build(&self, request: &ListingRequest) -> BrowseResult<Listing> {
        let relative = normalize_relative(&request.relative_path)?;
        let absolute = compose(&request.root_folder, &relative)?;
        let exit = if relative.is_empty() {
            None
        } else {
            Some(exit_target(&request.previous_path, &request.root_folder)?)
        };

        let ctx = BindContext {
            assignment_id: request.assignment_id,
            grouping_id: request.grouping_id,
            revision_number: self.revision.revision_number(),
            path: relative,
        };

        let mut rows = Vec::new();
        let mut missing_metadata = None;

        if let Some(exit) = exit.filter(|exit| !exit.is_root()) {
            let metadata = self
                .revision
                .directory_metadata(&exit.parent_path, &exit.current_dir_name)?;
            match bind_exit(&exit, metadata.as_ref(), &ctx, &request.action) {
                Ok(row) => rows.extend(row),
                Err(missing) => {
                    debug!(error = %missing, "dropping exit row");
                    missing_metadata = Some(missing);
                }
            }
        }

        if !self.revision.path_exists(&absolute)? {
            debug!(path = %absolute, revision = %ctx.revision_number, "path not found, listing exit only");
            return Ok(Listing {
                rows,
                missing_metadata,
            });
        }

        let files = match self.revision.files_at_path(&absolute) {
            Ok(files) => files,
            Err(StorageError::UnexpectedEntryType { .. }) => {
                debug!(path = %absolute, revision = %ctx.revision_number, "not a directory, listing exit only");
                return Ok(Listing {
                    rows,
                    missing_metadata,
                });
            }
            Err(e) => return Err(e.into()),
        };
        let directories = self.revision.directories_at_path(&absolute)?;

        rows.reserve(files.len() + directories.len());
        rows.extend(files.iter().map(|(name, file)| bind_file(name, file, &ctx)));
        rows.extend(
            directories
                .iter()
                .map(|(name, dir)| bind_directory(name, dir, &ctx, &request.action)),
        );

        debug!(
            path = %absolute,
            revision = %ctx.revision_number,
            files = files.len(),
            directories = directories.len(),
            "built listing"
        );
        Ok(Listing {
            rows,
            missing_metadata,
        })
    }
}

/// Build one listing of `request` against `revision`.
pub fn build_listing<R: Revision + ?Sized>(revision: &R, request: &ListingRequest) -> BrowseResult<Listing> {
    ListingBuilder::new(revision).build(request)
}
