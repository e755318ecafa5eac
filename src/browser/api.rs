//! Browser API - high-level interface for revbrowse.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::browse::{
    build_listing, BrowseError, Listing, ListingRequest, NameSanitizer, SanitizerConfig,
    SanitizerConfigError, DEFAULT_BROWSE_ACTION,
};
use crate::storage::{BranchName, CommitInfo, GitRevision, GitStore, RevisionNumber, StorageError};

/// Result type for browser operations.
pub type BrowserResult<T> = Result<T, BrowserError>;

/// Browser errors.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("browse error: {0}")]
    Browse(#[from] BrowseError),

    #[error("sanitizer error: {0}")]
    Sanitizer(#[from] SanitizerConfigError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Browser configuration options.
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Path to the repository.
    pub path: PathBuf,
    /// Branch revisions are numbered along.
    pub branch: String,
    /// Folder inside the repository that relative paths resolve against.
    pub root_folder: String,
    /// Action directory rows navigate with.
    pub action: String,
    /// File name sanitization rules.
    pub sanitizer: SanitizerConfig,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            branch: BranchName::MAIN.to_string(),
            root_folder: String::new(),
            action: DEFAULT_BROWSE_ACTION.to_string(),
            sanitizer: SanitizerConfig::default(),
        }
    }
}

impl BrowserConfig {
    /// Create a new configuration with the given repository path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Set the branch.
    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Set the root folder.
    pub fn root_folder(mut self, folder: impl Into<String>) -> Self {
        self.root_folder = folder.into();
        self
    }

    /// Set the browse action.
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    /// Set the sanitizer rules.
    pub fn sanitizer(mut self, sanitizer: SanitizerConfig) -> Self {
        self.sanitizer = sanitizer;
        self
    }
}

/// The main browser handle.
#[derive(Debug, Clone)]
pub struct RepoBrowser {
    config: BrowserConfig,
    store: GitStore,
    sanitizer: NameSanitizer,
}

impl RepoBrowser {
    /// Open the repository at `path` with default settings.
    pub fn open(path: impl AsRef<Path>) -> BrowserResult<Self> {
        Self::open_with_config(BrowserConfig::new(path.as_ref()))
    }

    /// Open a repository with the given configuration.
    pub fn open_with_config(config: BrowserConfig) -> BrowserResult<Self> {
        let branch = BranchName::new(config.branch.as_str())
            .map_err(|e| BrowserError::InvalidConfig(format!("branch '{}': {}", config.branch, e)))?;
        if config.action.is_empty() {
            return Err(BrowserError::InvalidConfig("browse action cannot be empty".into()));
        }
        let sanitizer = NameSanitizer::new(&config.sanitizer)?;
        let store = GitStore::open(&config.path)?.with_branch(branch);

        debug!(path = %config.path.display(), branch = %config.branch, "browser ready");
        Ok(Self {
            config,
            store,
            sanitizer,
        })
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    pub fn store(&self) -> &GitStore {
        &self.store
    }

    /// A request for `relative_path` using the configured root and action.
    pub fn request(&self, relative_path: impl Into<String>) -> ListingRequest {
        ListingRequest::new(self.config.root_folder.clone(), relative_path).action(self.config.action.clone())
    }

    /// Resolve a revision, defaulting to the newest.
    pub fn revision(&self, number: Option<RevisionNumber>) -> BrowserResult<GitRevision> {
        let revision = match number {
            Some(number) => self.store.revision(number)?,
            None => self.store.latest_revision()?,
        };
        Ok(revision)
    }

    /// List a directory at a revision (the newest if `None`).
    pub fn listing(&self, number: Option<RevisionNumber>, request: &ListingRequest) -> BrowserResult<Listing> {
        let revision = self.revision(number)?;
        Ok(build_listing(&revision, request)?)
    }

    /// List a directory at the newest revision.
    pub fn latest_listing(&self, request: &ListingRequest) -> BrowserResult<Listing> {
        self.listing(None, request)
    }

    /// Revisions of the branch, newest first, each with its commit.
    pub fn history(&self, limit: Option<usize>) -> BrowserResult<Vec<(RevisionNumber, CommitInfo)>> {
        let count = self.store.revision_count()?;
        let commits = self.store.history(limit)?;
        Ok((1..=count)
            .rev()
            .map(RevisionNumber::new)
            .zip(commits)
            .collect())
    }

    /// Sanitize a user-supplied file name.
    pub fn sanitize(&self, name: Option<&str>) -> String {
        self.sanitizer.sanitize(name)
    }
}
