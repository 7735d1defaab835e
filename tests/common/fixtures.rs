//! Test data factories for git-staging types

#![allow(dead_code)]

use git_staging::group::GroupRequest;
use git_staging::types::{PrRef, PrState, PullRequest, Repository};
use std::path::Path;

/// Owner of the project repository used throughout the tests
pub const PROJECT_OWNER: &str = "products";

/// Name of the project repository used throughout the tests
pub const PROJECT_REPO: &str = "SLFO";

/// Base branch of the project repository
pub const BASE_BRANCH: &str = "main";

/// Clone directory name for the project base
pub const CLONE_DIR: &str = "products_SLFO_main";

/// Reference to a forwarding PR against the project repository
pub fn fwd(number: u64) -> PrRef {
    PrRef::new(PROJECT_OWNER, PROJECT_REPO, number)
}

/// Reference to a package PR in `pool/<package>`
pub fn pkg(package: &str, number: u64) -> PrRef {
    PrRef::new("pool", package, number)
}

/// Create an open pull request with default values
pub fn make_pr(reference: &PrRef) -> PullRequest {
    PullRequest {
        owner: reference.owner.clone(),
        repo: reference.repo.clone(),
        number: reference.number,
        title: format!("PR {}", reference.number),
        body: String::new(),
        labels: Vec::new(),
        base_ref: BASE_BRANCH.to_string(),
        head_ref: format!("feature-{}", reference.number),
        head_sha: format!("{}_{}_sha", reference.repo, reference.number),
        html_url: format!(
            "https://src.example.org/{}/{}/pulls/{}",
            reference.owner, reference.repo, reference.number
        ),
        state: PrState::Open,
    }
}

/// Forwarding PR labeled for staging that references package PRs
pub fn make_forwarding_pr(reference: &PrRef, packages: &[PrRef]) -> PullRequest {
    let body = packages
        .iter()
        .map(|p| format!("PR: {}", p.to_package_ref()))
        .collect::<Vec<_>>()
        .join("\n");

    PullRequest {
        title: format!("Forward {}", reference.number),
        body: format!("Forwarded package updates\n\n{body}\n"),
        labels: vec!["staging_backlog".to_string()],
        ..make_pr(reference)
    }
}

/// Forwarding PR without the backlog label
pub fn make_unlabeled_forwarding_pr(reference: &PrRef, packages: &[PrRef]) -> PullRequest {
    PullRequest {
        labels: Vec::new(),
        ..make_forwarding_pr(reference, packages)
    }
}

/// Repository with conventional clone URLs
pub fn make_repo(owner: &str, name: &str) -> Repository {
    Repository {
        owner: owner.to_string(),
        name: name.to_string(),
        clone_url: format!("https://src.example.org/{owner}/{name}.git"),
        ssh_url: format!("gitea@src.example.org:{owner}/{name}.git"),
    }
}

/// Request for a new staging PR on branch `staging`
pub fn new_group_request(workdir: &Path, forwarding: Vec<PrRef>) -> GroupRequest {
    GroupRequest {
        forwarding,
        title: "Staging batch".to_string(),
        branch: Some("staging".to_string()),
        grouped_pr: None,
        workdir: workdir.to_path_buf(),
        fork: None,
        force: false,
        dry_run: false,
    }
}
