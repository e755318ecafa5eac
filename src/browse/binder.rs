//! Turning backend entries into display rows.
//!
//! Binding is pure: every function here works on entries the caller has
//! already fetched and never queries a revision itself.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::browse::error::MissingMetadata;
use crate::browse::path::{join_relative, ExitTarget};
use crate::storage::{DirectoryEntry, FileEntry, RevisionNumber};

/// Display name of the synthetic "go up" row.
pub const EXIT_ROW_NAME: &str = "go up";

/// Action a file row's target points at.
pub const DOWNLOAD_ACTION: &str = "download";

pub type AssignmentId = u64;
pub type GroupingId = u64;

/// Stable identity of a listed entry.
///
/// Derived from the listed directory, the revision and the entry name, so
/// the same entry gets the same id on every request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    const LEN: usize = 16;

    pub fn derive(path: &str, revision: RevisionNumber, name: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(path.as_bytes());
        hasher.update([0u8]);
        hasher.update(revision.get().to_be_bytes());
        hasher.update([0u8]);
        hasher.update(name.as_bytes());
        let hex = format!("{:x}", hasher.finalize());
        Self(hex[..Self::LEN].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    Exit,
    File,
    Directory,
}

/// Where following a row leads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NavTarget {
    /// browse a directory with the given action
    Browse {
        action: String,
        grouping_id: GroupingId,
        revision_number: RevisionNumber,
        path: String,
    },
    /// download a file
    Download {
        assignment_id: AssignmentId,
        revision_number: RevisionNumber,
        file_name: String,
        path: String,
        grouping_id: GroupingId,
    },
}

impl NavTarget {
    pub fn action(&self) -> &str {
        match self {
            NavTarget::Browse { action, .. } => action,
            NavTarget::Download { .. } => DOWNLOAD_ACTION,
        }
    }

    /// the relative path the target resolves to
    pub fn path(&self) -> &str {
        match self {
            NavTarget::Browse { path, .. } | NavTarget::Download { path, .. } => path,
        }
    }
}

/// One display-ready entry of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingRow {
    pub id: Option<EntryId>,
    pub kind: RowKind,
    pub name: String,
    pub target: NavTarget,
    pub last_revised_date: DateTime<Utc>,
    pub last_modified_revision: RevisionNumber,
    pub revision_by: String,
}

/// Request context shared by every row of one listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindContext {
    pub assignment_id: AssignmentId,
    pub grouping_id: GroupingId,
    pub revision_number: RevisionNumber,
    /// canonical relative path of the listed directory
    pub path: String,
}

impl BindContext {
    fn entry_id(&self, name: &str) -> EntryId {
        EntryId::derive(&self.path, self.revision_number, name)
    }
}

pub fn bind_file(name: &str, file: &FileEntry, ctx: &BindContext) -> ListingRow {
    ListingRow {
        id: Some(ctx.entry_id(name)),
        kind: RowKind::File,
        name: name.to_string(),
        target: NavTarget::Download {
            assignment_id: ctx.assignment_id,
            revision_number: ctx.revision_number,
            file_name: name.to_string(),
            path: ctx.path.clone(),
            grouping_id: ctx.grouping_id,
        },
        last_revised_date: file.last_modified_date,
        last_modified_revision: file.last_modified_revision,
        revision_by: file.user_id.clone(),
    }
}

pub fn bind_directory(name: &str, dir: &DirectoryEntry, ctx: &BindContext, action: &str) -> ListingRow {
    ListingRow {
        id: Some(ctx.entry_id(name)),
        kind: RowKind::Directory,
        name: format!("{}/", name),
        target: NavTarget::Browse {
            action: action.to_string(),
            grouping_id: ctx.grouping_id,
            revision_number: ctx.revision_number,
            path: join_relative(&ctx.path, name),
        },
        last_revised_date: dir.last_modified_date,
        last_modified_revision: dir.last_modified_revision,
        revision_by: dir.user_id.clone(),
    }
}

/// Build the "go up" row.
///
/// `metadata` is the departing directory's own entry as found in its
/// parent. No row is produced for an exit from the root.
pub fn bind_exit(
    exit: &ExitTarget,
    metadata: Option<&DirectoryEntry>,
    ctx: &BindContext,
    action: &str,
) -> Result<Option<ListingRow>, MissingMetadata> {
    if exit.is_root() {
        return Ok(None);
    }

    let dir = metadata.ok_or_else(|| MissingMetadata {
        parent: exit.parent_path.clone(),
        name: exit.current_dir_name.clone(),
    })?;

    Ok(Some(ListingRow {
        id: None,
        kind: RowKind::Exit,
        name: EXIT_ROW_NAME.to_string(),
        target: NavTarget::Browse {
            action: action.to_string(),
            grouping_id: ctx.grouping_id,
            revision_number: ctx.revision_number,
            path: exit.previous_path.clone(),
        },
        last_revised_date: dir.last_modified_date,
        last_modified_revision: dir.last_modified_revision,
        revision_by: dir.user_id.clone(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browse::path::exit_target;
    use crate::storage::ContentHandle;
    use chrono::TimeZone;

    fn ctx() -> BindContext {
        BindContext {
            assignment_id: 7,
            grouping_id: 42,
            revision_number: RevisionNumber::new(9),
            path: "a/b".to_string(),
        }
    }

    fn dir_entry(name: &str) -> DirectoryEntry {
        DirectoryEntry {
            name: name.to_string(),
            user_id: "u3".to_string(),
            last_modified_date: Utc.with_ymd_and_hms(2021, 2, 3, 0, 0, 0).unwrap(),
            last_modified_revision: RevisionNumber::new(8),
        }
    }

    #[test]
    fn test_entry_id_is_deterministic() {
        let a = EntryId::derive("a/b", RevisionNumber::new(3), "x.txt");
        let b = EntryId::derive("a/b", RevisionNumber::new(3), "x.txt");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 16);

        assert_ne!(a, EntryId::derive("a/b", RevisionNumber::new(4), "x.txt"));
        assert_ne!(a, EntryId::derive("a", RevisionNumber::new(3), "b/x.txt"));
    }

    #[test]
    fn test_bind_file() {
        let file = FileEntry {
            name: "x.txt".to_string(),
            user_id: "u2".to_string(),
            last_modified_date: Utc.with_ymd_and_hms(2021, 2, 2, 0, 0, 0).unwrap(),
            last_modified_revision: RevisionNumber::new(7),
            content: ContentHandle::new("blob-1"),
        };

        let row = bind_file("x.txt", &file, &ctx());
        assert_eq!(row.kind, RowKind::File);
        assert_eq!(row.name, "x.txt");
        assert_eq!(row.revision_by, "u2");
        assert_eq!(row.last_modified_revision, RevisionNumber::new(7));
        assert!(row.id.is_some());
        assert_eq!(
            row.target,
            NavTarget::Download {
                assignment_id: 7,
                revision_number: RevisionNumber::new(9),
                file_name: "x.txt".to_string(),
                path: "a/b".to_string(),
                grouping_id: 42,
            }
        );
        assert_eq!(row.target.action(), DOWNLOAD_ACTION);
    }

    #[test]
    fn test_bind_directory() {
        let row = bind_directory("c", &dir_entry("c"), &ctx(), "repo_browser");
        assert_eq!(row.kind, RowKind::Directory);
        assert_eq!(row.name, "c/");
        assert_eq!(row.target.path(), "a/b/c");
        assert_eq!(row.target.action(), "repo_browser");
        assert_eq!(row.revision_by, "u3");
    }

    #[test]
    fn test_bind_directory_at_root() {
        let mut ctx = ctx();
        ctx.path = String::new();
        let row = bind_directory("c", &dir_entry("c"), &ctx, "repo_browser");
        assert_eq!(row.target.path(), "c");
    }

    #[test]
    fn test_bind_exit() {
        let exit = exit_target("a", "/submissions").unwrap();
        let row = bind_exit(&exit, Some(&dir_entry("a")), &ctx(), "repo_browser")
            .unwrap()
            .unwrap();

        assert_eq!(row.id, None);
        assert_eq!(row.kind, RowKind::Exit);
        assert_eq!(row.name, EXIT_ROW_NAME);
        assert_eq!(row.target.path(), "a");
        assert_eq!(row.last_modified_revision, RevisionNumber::new(8));
    }

    #[test]
    fn test_bind_exit_from_root() {
        let exit = exit_target("", "/submissions").unwrap();
        assert_eq!(bind_exit(&exit, None, &ctx(), "repo_browser"), Ok(None));
    }

    #[test]
    fn test_bind_exit_missing_metadata() {
        let exit = exit_target("a", "/submissions").unwrap();
        let err = bind_exit(&exit, None, &ctx(), "repo_browser").unwrap_err();
        assert_eq!(
            err,
            MissingMetadata {
                parent: "/submissions".to_string(),
                name: "a".to_string(),
            }
        );
    }
}
