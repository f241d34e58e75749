//! # Version-Control Capability
//!
//! The engine never runs `git` directly. Everything it needs from version
//! control goes through the [`GitOperations`] trait:
//!
//! - cloning a branch into a scratch directory,
//! - checking out a pinned revision and reading back HEAD,
//! - initializing the throwaway repository a dependency build runs in,
//! - stripping metadata and dropping a file from the host index.
//!
//! Every operation returns a `Result`, so the callers decide which failures
//! are fatal (clone, checkout, init) and which are reported as warnings
//! (metadata cleanup). [`DefaultGitOperations`] wraps the system `git`
//! command; tests substitute recording mocks.

use crate::error::Result;
use std::path::Path;

/// Trait for git operations - allows mocking in tests
pub trait GitOperations {
    /// Clones `url` at `branch` into `target_dir`, replacing anything there.
    fn clone_branch(&self, url: &str, branch: &str, target_dir: &Path) -> Result<()>;

    /// Checks out an exact revision inside an existing clone.
    fn checkout(&self, repo_dir: &Path, revision: &str) -> Result<()>;

    /// Returns the revision HEAD resolves to.
    fn head_revision(&self, repo_dir: &Path) -> Result<String>;

    /// Initializes an empty repository at `dir`, creating it if needed.
    fn init(&self, dir: &Path) -> Result<()>;

    /// Deletes the version-control metadata of `dir`. Returns whether
    /// anything was removed.
    fn remove_metadata(&self, dir: &Path) -> Result<bool>;

    /// Removes `path` from the index of the repository at `repo_root`
    /// without deleting it from disk.
    fn untrack(&self, repo_root: &Path, path: &str) -> Result<()>;

    /// Whether `dir` carries version-control metadata of its own.
    fn has_metadata(&self, dir: &Path) -> bool {
        dir.join(".git").exists()
    }
}

/// The default implementation of `GitOperations`, which uses the system's
/// `git` command to perform real Git operations.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultGitOperations;

impl GitOperations for DefaultGitOperations {
    fn clone_branch(&self, url: &str, branch: &str, target_dir: &Path) -> Result<()> {
        crate::git::clone_branch(url, branch, target_dir)
    }

    fn checkout(&self, repo_dir: &Path, revision: &str) -> Result<()> {
        crate::git::checkout(repo_dir, revision)
    }

    fn head_revision(&self, repo_dir: &Path) -> Result<String> {
        crate::git::head_revision(repo_dir)
    }

    fn init(&self, dir: &Path) -> Result<()> {
        crate::git::init(dir)
    }

    fn remove_metadata(&self, dir: &Path) -> Result<bool> {
        crate::git::remove_metadata(dir)
    }

    fn untrack(&self, repo_root: &Path, path: &str) -> Result<()> {
        crate::git::untrack(repo_root, path)
    }
}
