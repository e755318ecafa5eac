//! Test fixtures: scratch git repositories with a fluent commit builder.

use std::cell::Cell;
use std::path::Path;

use git2::build::TreeUpdateBuilder;
use git2::{FileMode, Repository, RepositoryInitOptions, Signature, Time};
use tempfile::TempDir;

use crate::storage::types::CommitId;

/// A throwaway repository whose `main` branch tests append commits to.
pub(crate) struct FixtureRepo {
    dir: TempDir,
    repo: Repository,
    clock: Cell<i64>,
}

impl FixtureRepo {
    pub(crate) fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = Repository::init_opts(dir.path(), &opts).unwrap();
        Self {
            dir,
            repo,
            clock: Cell::new(1_600_000_000),
        }
    }

    pub(crate) fn path(&self) -> &Path {
        self.dir.path()
    }

    pub(crate) fn repo(&self) -> &Repository {
        &self.repo
    }

    /// start a commit on top of `main`
    pub(crate) fn commit(&self) -> FixtureCommit<'_> {
        let time = self.clock.get() + 60;
        self.clock.set(time);
        FixtureCommit {
            fixture: self,
            author: "tester".to_string(),
            time,
            message: "fixture commit".to_string(),
            writes: Vec::new(),
            removals: Vec::new(),
            extra_parents: Vec::new(),
            update_branch: true,
        }
    }

    fn main_head(&self) -> Option<git2::Commit<'_>> {
        self.repo
            .find_reference("refs/heads/main")
            .ok()
            .and_then(|r| r.peel_to_commit().ok())
    }
}

/// builder for one fixture commit
pub(crate) struct FixtureCommit<'a> {
    fixture: &'a FixtureRepo,
    author: String,
    time: i64,
    message: String,
    writes: Vec<(String, String)>,
    removals: Vec<String>,
    extra_parents: Vec<CommitId>,
    update_branch: bool,
}

impl<'a> FixtureCommit<'a> {
    pub(crate) fn author(mut self, author: &str) -> Self {
        self.author = author.to_string();
        self
    }

    /// author time in seconds since the epoch
    pub(crate) fn at(mut self, seconds: i64) -> Self {
        self.time = seconds;
        self
    }

    pub(crate) fn message(mut self, message: &str) -> Self {
        self.message = message.to_string();
        self
    }

    pub(crate) fn write(mut self, path: &str, content: &str) -> Self {
        self.writes.push((path.to_string(), content.to_string()));
        self
    }

    pub(crate) fn remove(mut self, path: &str) -> Self {
        self.removals.push(path.to_string());
        self
    }

    /// add a second parent, making this a merge commit
    pub(crate) fn merge(mut self, other: CommitId) -> Self {
        self.extra_parents.push(other);
        self
    }

    /// do not move `main` to the new commit
    pub(crate) fn detached(mut self) -> Self {
        self.update_branch = false;
        self
    }

    pub(crate) fn commit(self) -> CommitId {
        let repo = &self.fixture.repo;
        let head = self.fixture.main_head();

        let baseline = match &head {
            Some(commit) => commit.tree().unwrap(),
            None => {
                let empty = repo.treebuilder(None).unwrap().write().unwrap();
                repo.find_tree(empty).unwrap()
            }
        };

        let mut update = TreeUpdateBuilder::new();
        for (path, content) in &self.writes {
            let blob = repo.blob(content.as_bytes()).unwrap();
            update.upsert(path.as_str(), blob, FileMode::Blob);
        }
        for path in &self.removals {
            update.remove(path.as_str());
        }
        let tree_id = update.create_updated(repo, &baseline).unwrap();
        let tree = repo.find_tree(tree_id).unwrap();

        let email = format!("{}@example.com", self.author);
        let sig = Signature::new(&self.author, &email, &Time::new(self.time, 0)).unwrap();

        let mut parents: Vec<git2::Commit<'_>> = head.into_iter().collect();
        for id in &self.extra_parents {
            parents.push(repo.find_commit(id.raw()).unwrap());
        }
        let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();

        let update_ref = if self.update_branch {
            Some("refs/heads/main")
        } else {
            None
        };
        let oid = repo
            .commit(update_ref, &sig, &sig, &self.message, &tree, &parent_refs)
            .unwrap();
        CommitId::new(oid)
    }
}
