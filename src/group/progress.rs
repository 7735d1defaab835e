//! Progress callback trait for interface-agnostic updates
//!
//! The grouping workflow never prints. Interfaces implement
//! [`ProgressCallback`] to render what happens.

use crate::types::{PrRef, PullRequest};
use async_trait::async_trait;
use std::fmt;

/// Grouping phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Loading the grouped PR and the forwarding PRs
    Resolving,
    /// Cloning or updating the project repository
    PreparingWorkspace,
    /// Checking out package PR heads in submodules
    SyncingSubmodules,
    /// Committing, pushing and creating or updating the staging PR
    Publishing,
    /// Closing forwarding PRs
    Closing,
    /// Grouping complete
    Complete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Resolving => "Resolving pull requests",
            Self::PreparingWorkspace => "Preparing workspace",
            Self::SyncingSubmodules => "Updating submodules",
            Self::Publishing => "Publishing staging PR",
            Self::Closing => "Closing forwarded PRs",
            Self::Complete => "Done",
        };
        f.write_str(s)
    }
}

/// Progress callback trait
///
/// Implement this trait to receive progress updates during grouping.
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Called when entering a new phase
    async fn on_phase(&self, phase: Phase);

    /// Called after a forwarding PR was validated
    async fn on_forwarded(&self, pr: &PullRequest, packages: &[PrRef]);

    /// Called before a package PR is checked out in its submodule
    async fn on_package(&self, reference: &PrRef);

    /// Called when the forge reports a pull request as missing
    async fn on_not_found(&self, reference: &PrRef);

    /// Called when the staging PR is created
    async fn on_pr_created(&self, pr: &PullRequest);

    /// Called when the description of an existing staging PR is replaced
    async fn on_pr_updated(&self, pr: &PullRequest);

    /// Called when a forwarding PR is closed
    async fn on_pr_closed(&self, reference: &PrRef);

    /// Called with a general status message
    async fn on_message(&self, message: &str);
}

/// No-op progress callback for testing or when progress isn't needed
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_phase(&self, _phase: Phase) {}
    async fn on_forwarded(&self, _pr: &PullRequest, _packages: &[PrRef]) {}
    async fn on_package(&self, _reference: &PrRef) {}
    async fn on_not_found(&self, _reference: &PrRef) {}
    async fn on_pr_created(&self, _pr: &PullRequest) {}
    async fn on_pr_updated(&self, _pr: &PullRequest) {}
    async fn on_pr_closed(&self, _reference: &PrRef) {}
    async fn on_message(&self, _message: &str) {}
}
