//! Platform services for Gitea, GitHub and GitLab
//!
//! Provides a unified interface for the PR/MR operations the grouping
//! workflow needs, across platforms.

mod detection;
mod factory;
mod gitea;
mod github;
mod gitlab;

pub use detection::{detect_platform, parse_repo_info, RepoLocation};
pub use factory::{base_url, build_service, create_platform_service, resolve_auth};
pub use gitea::GiteaService;
pub use github::GitHubService;
pub use gitlab::GitLabService;

use crate::error::Result;
use crate::types::{CreatePullRequest, PlatformConfig, PullRequest, Repository};
use async_trait::async_trait;

/// Platform service trait for PR/MR operations
///
/// Unlike a per-repository client, every method names the repository it acts
/// on, since a grouping run touches the project repository and every package
/// repository through the same connection.
///
/// A 404 from the forge must be reported as [`Error::NotFound`] so callers
/// can tell vanished entries apart from real failures.
///
/// [`Error::NotFound`]: crate::error::Error::NotFound
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Fetch a pull request
    async fn get_pr(&self, owner: &str, repo: &str, number: u64) -> Result<PullRequest>;

    /// Open a new pull request
    async fn create_pr(&self, request: &CreatePullRequest) -> Result<PullRequest>;

    /// Replace the description of a pull request
    async fn update_pr_body(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<PullRequest>;

    /// Attach labels to a pull request
    async fn add_labels(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        labels: &[&str],
    ) -> Result<()>;

    /// Close a pull request without merging
    async fn close_pr(&self, owner: &str, repo: &str, number: u64) -> Result<()>;

    /// Fetch a repository
    async fn get_repo(&self, owner: &str, repo: &str) -> Result<Repository>;

    /// Login name of the authenticated user
    async fn current_user(&self) -> Result<String>;

    /// Ref under which the forge publishes the head of a pull request
    fn pull_request_refspec(&self, number: u64) -> String {
        format!("refs/pull/{number}/head")
    }

    /// Get the platform configuration
    fn config(&self) -> &PlatformConfig;
}
