//! Local git operations
//!
//! The grouping workflow drives git through the [`GitBackend`] trait so the
//! orchestration can run against a recording mock in tests. [`GitCli`] is the
//! implementation used by the binary; it shells out to `git`.

mod cli;

pub use cli::GitCli;

use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Name of the remote the project repository is cloned from
pub const ORIGIN: &str = "origin";

/// Name of the remote added for `--fork`
pub const FORK_REMOTE: &str = "fork";

/// Local branch a pull request head is fetched into
pub fn pull_request_branch(number: u64) -> String {
    format!("pull/{number}")
}

/// State of a submodule as reported by `git submodule status`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmoduleState {
    /// `-`: not initialized
    Uninitialized,
    /// ` `: checked out at the recorded commit
    Clean,
    /// `+`: checked out at a different commit
    Modified,
    /// `U`: merge conflicts
    Conflict,
}

impl SubmoduleState {
    /// Parse the status prefix character of a `git submodule status` line
    pub fn from_status_line(line: &str) -> Option<Self> {
        match line.chars().next()? {
            '-' => Some(Self::Uninitialized),
            ' ' => Some(Self::Clean),
            '+' => Some(Self::Modified),
            'U' => Some(Self::Conflict),
            _ => None,
        }
    }
}

/// Git operations used by the grouping workflow
///
/// Every method takes the repository directory it operates in.
#[async_trait]
pub trait GitBackend: Send + Sync {
    /// Clone `url` at `branch` into `dir`, or fetch and reset `branch` to the
    /// remote when `dir` already holds a clone
    async fn clone_or_update(&self, url: &str, branch: &str, dir: &Path, remote: &str)
    -> Result<()>;

    /// Fetch a remote
    async fn fetch(&self, dir: &Path, remote: &str) -> Result<()>;

    /// Status of the submodule at `path` (relative to `dir`)
    async fn submodule_status(&self, dir: &Path, path: &str) -> Result<SubmoduleState>;

    /// Initialize and check out the submodule at `path`
    async fn submodule_init(&self, dir: &Path, path: &str) -> Result<()>;

    /// Discard local changes to tracked files
    async fn reset_hard(&self, dir: &Path) -> Result<()>;

    /// Fetch a pull request head into local branch `pull/<number>`
    ///
    /// The branch is overwritten, then pinned to `commit` when one is given.
    /// Returns the branch name.
    async fn fetch_pull_request(
        &self,
        dir: &Path,
        remote: &str,
        refspec: &str,
        number: u64,
        commit: &str,
    ) -> Result<String>;

    /// Switch to `branch`, discarding local changes
    async fn switch(&self, dir: &Path, branch: &str) -> Result<()>;

    /// Check out an existing local branch, carrying staged changes along
    async fn checkout(&self, dir: &Path, branch: &str) -> Result<()>;

    /// Create local `branch` tracking `remote/branch` and check it out
    async fn checkout_tracking(&self, dir: &Path, remote: &str, branch: &str) -> Result<()>;

    /// Create `branch` at HEAD and check it out
    async fn create_branch(&self, dir: &Path, branch: &str) -> Result<()>;

    /// Point `branch` at `start`, creating or overwriting it
    async fn force_branch(&self, dir: &Path, branch: &str, start: &str) -> Result<()>;

    /// Stage paths
    async fn add(&self, dir: &Path, paths: &[PathBuf]) -> Result<()>;

    /// Whether the index differs from HEAD
    async fn has_staged_changes(&self, dir: &Path) -> Result<bool>;

    /// Commit the index
    async fn commit(&self, dir: &Path, message: &str) -> Result<()>;

    /// Push `branch` to `remote`, setting upstream
    async fn push(&self, dir: &Path, remote: &str, branch: &str, force: bool) -> Result<()>;

    /// Add a remote
    async fn add_remote(&self, dir: &Path, name: &str, url: &str) -> Result<()>;

    /// URL of a remote, `None` when it is not configured
    async fn remote_url(&self, dir: &Path, name: &str) -> Result<Option<String>>;

    /// Whether a local branch exists
    async fn branch_exists(&self, dir: &Path, branch: &str) -> Result<bool>;

    /// Whether `branch` exists on `remote`
    async fn remote_branch_exists(&self, dir: &Path, remote: &str, branch: &str) -> Result<bool>;

    /// Delete a local branch, merged or not
    async fn delete_branch(&self, dir: &Path, branch: &str) -> Result<()>;

    /// Delete the remote-tracking ref `remote/branch`
    async fn delete_remote_tracking(&self, dir: &Path, remote: &str, branch: &str) -> Result<()>;
}
