//! Error types for git-staging

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while grouping pull requests
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or conflicting command-line input
    #[error("{0}")]
    Usage(String),

    /// A forwarding PR targets a different base than the ones before it
    #[error("all PRs must target the same base, mismatch found in {reference} (expected {expected}, found {found})")]
    BaseMismatch {
        /// The offending forwarding PR
        reference: String,
        /// Base established by earlier PRs
        expected: String,
        /// Base of the offending PR
        found: String,
    },

    /// A forwarding PR lacks the backlog label
    #[error("PR {reference} is missing the '{label}' label")]
    MissingLabel {
        /// The offending forwarding PR
        reference: String,
        /// Label that was required
        label: String,
    },

    /// A forwarding PR references no package PRs
    #[error("no package references found in PR {0}")]
    NoPackageReferences(String),

    /// The staging branch already exists and `--force` was not given
    #[error("branch '{0}' already exists")]
    BranchExists(String),

    /// Package repository has no submodule in the working copy
    #[error("submodule path '{}' does not exist", .0.display())]
    SubmoduleMissing(PathBuf),

    /// Working directory does not exist
    #[error("working directory '{}' does not exist", .0.display())]
    WorkdirMissing(PathBuf),

    /// Fork repository is malformed or inaccessible
    #[error("invalid or inaccessible fork '{fork}': {reason}")]
    InvalidFork {
        /// Fork as given on the command line
        fork: String,
        /// Why it was rejected
        reason: String,
    },

    /// Existing grouped PR could not be loaded
    #[error("failed to process '{reference}': {reason}")]
    GroupedPr {
        /// Grouped PR reference
        reference: String,
        /// Underlying failure
        reason: String,
    },

    /// Forge returned 404 for a resource
    #[error("not found: {0}")]
    NotFound(String),

    /// References that could not be retrieved during the run
    #[error("could not retrieve: {}", .0.join(", "))]
    Unresolved(Vec<String>),

    /// Gitea API error
    #[error("Gitea API error: {0}")]
    GiteaApi(String),

    /// GitHub API error
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// GitLab API error
    #[error("GitLab API error: {0}")]
    GitLabApi(String),

    /// Generic platform error
    #[error("platform error: {0}")]
    Platform(String),

    /// A git command failed
    #[error("git {command} failed: {stderr}")]
    Git {
        /// Arguments passed to git
        command: String,
        /// Captured standard error
        stderr: String,
    },

    /// Authentication error
    #[error("authentication error: {0}")]
    Auth(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Parse error
    #[error("parse error: {0}")]
    Parse(String),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the forge reported the resource as missing
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.status() == Some(reqwest::StatusCode::NOT_FOUND) {
            return Self::NotFound(e.url().map_or_else(String::new, ToString::to_string));
        }
        Self::Platform(e.to_string())
    }
}

impl From<octocrab::Error> for Error {
    fn from(e: octocrab::Error) -> Self {
        match e {
            octocrab::Error::GitHub { source, .. } if source.status_code.as_u16() == 404 => {
                Self::NotFound(source.message)
            }
            other => Self::GitHubApi(other.to_string()),
        }
    }
}
