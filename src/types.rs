//! Core types for git-staging

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Reference to a pull request: `owner/repo#number`
///
/// Ordering is by owner, then repository, then number, which keeps every
/// list of references printed or published by the tool deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrRef {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Pull request number
    pub number: u64,
}

impl PrRef {
    /// Create a new reference
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, number: u64) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            number,
        }
    }

    /// Render with the `!` separator used inside PR descriptions
    pub fn to_package_ref(&self) -> String {
        format!("{}/{}!{}", self.owner, self.repo, self.number)
    }
}

impl fmt::Display for PrRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

impl FromStr for PrRef {
    type Err = Error;

    /// Parse `owner/repo#number` or `owner/repo!number`
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (path, number) = s
            .rsplit_once(['#', '!'])
            .ok_or_else(|| Error::Parse(format!("invalid pull request reference: {s}")))?;

        let number: u64 = number
            .parse()
            .map_err(|_| Error::Parse(format!("invalid pull request number in: {s}")))?;

        let (owner, repo) = split_repo_path(path)
            .ok_or_else(|| Error::Parse(format!("invalid pull request reference: {s}")))?;

        Ok(Self::new(owner, repo, number))
    }
}

/// Split `owner/repo` into its parts
///
/// The owner may itself contain slashes (GitLab subgroups); the repository
/// name is the last path segment.
pub fn split_repo_path(path: &str) -> Option<(&str, &str)> {
    let (owner, repo) = path.rsplit_once('/')?;
    if owner.is_empty() || repo.is_empty() || owner.split('/').any(str::is_empty) {
        return None;
    }
    Some((owner, repo))
}

/// Target base all grouped pull requests must agree on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BaseTarget {
    /// Base repository owner
    pub owner: String,
    /// Base repository name
    pub repo: String,
    /// Base branch
    pub branch: String,
}

impl BaseTarget {
    /// Directory name of the working copy for this base
    pub fn workspace_dir_name(&self) -> String {
        format!("{}_{}_{}", self.owner, self.repo, self.branch)
    }
}

impl fmt::Display for BaseTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.owner, self.repo, self.branch)
    }
}

/// Pull request state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrState {
    /// Open
    Open,
    /// Closed without merging
    Closed,
    /// Merged
    Merged,
}

/// A pull request / merge request
#[derive(Debug, Clone)]
pub struct PullRequest {
    /// Owner of the repository the PR targets
    pub owner: String,
    /// Repository the PR targets
    pub repo: String,
    /// PR/MR number
    pub number: u64,
    /// PR/MR title
    pub title: String,
    /// Description text
    pub body: String,
    /// Label names
    pub labels: Vec<String>,
    /// Base branch name
    pub base_ref: String,
    /// Head branch name
    pub head_ref: String,
    /// Head commit SHA
    pub head_sha: String,
    /// Web URL for the PR/MR
    pub html_url: String,
    /// Current state
    pub state: PrState,
}

impl PullRequest {
    /// Reference to this pull request
    pub fn reference(&self) -> PrRef {
        PrRef::new(&self.owner, &self.repo, self.number)
    }

    /// Base this pull request targets
    pub fn base(&self) -> BaseTarget {
        BaseTarget {
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            branch: self.base_ref.clone(),
        }
    }

    /// Whether the PR carries a label
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

/// A repository on the forge
#[derive(Debug, Clone)]
pub struct Repository {
    /// Owner (user, organization or namespace)
    pub owner: String,
    /// Repository name
    pub name: String,
    /// HTTPS clone URL
    pub clone_url: String,
    /// SSH clone URL
    pub ssh_url: String,
}

impl Repository {
    /// Pick the clone URL for a protocol, falling back to the other one when empty
    pub fn url_for(&self, protocol: CloneProtocol) -> &str {
        let (preferred, fallback) = match protocol {
            CloneProtocol::Ssh => (&self.ssh_url, &self.clone_url),
            CloneProtocol::Https => (&self.clone_url, &self.ssh_url),
        };
        if preferred.is_empty() {
            fallback
        } else {
            preferred
        }
    }
}

/// Parameters for opening a pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePullRequest {
    /// Owner of the repository receiving the PR
    pub target_owner: String,
    /// Repository receiving the PR
    pub target_repo: String,
    /// Branch the PR merges into
    pub target_branch: String,
    /// Owner of the repository holding the head branch
    pub source_owner: String,
    /// Repository holding the head branch
    pub source_repo: String,
    /// Head branch
    pub source_branch: String,
    /// Title
    pub title: String,
    /// Description
    pub body: String,
}

/// Protocol used for clone and fork remotes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloneProtocol {
    /// `git@host:owner/repo.git`
    #[default]
    Ssh,
    /// `https://host/owner/repo.git`
    Https,
}

/// Detected platform type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Gitea or Forgejo
    Gitea,
    /// GitHub or GitHub Enterprise
    GitHub,
    /// GitLab or self-hosted GitLab
    GitLab,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gitea => write!(f, "Gitea"),
            Self::GitHub => write!(f, "GitHub"),
            Self::GitLab => write!(f, "GitLab"),
        }
    }
}

/// Platform configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Platform type
    pub platform: Platform,
    /// Custom host (None for github.com/gitlab.com)
    pub host: Option<String>,
}
