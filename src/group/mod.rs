//! Two-phase grouping engine
//!
//! Groups forwarded package PRs into one staging PR:
//! 1. Resolution - load and validate the PRs, collect package references
//! 2. Execution - update submodules, publish the staging PR, close the
//!    forwarded PRs

mod describe;
mod execute;
mod progress;
mod references;
mod resolve;

pub use describe::{
    build_description, closes_annotation, commit_body, created_commit_message,
    updated_commit_message,
};
pub use execute::{
    close_forwarded, prepare_workspace, publish, run_group, sync_submodules, GroupResult,
    GroupSettings, PublishOutcome,
};
pub use progress::{NoopProgress, Phase, ProgressCallback};
pub use references::{parse_closes, parse_pr_references};
pub use resolve::{resolve_group, GroupRequest, GroupingContext};
