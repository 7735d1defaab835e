//! Phase 2: Execution
//!
//! Clones the project, checks out every package PR in its submodule, pushes
//! the staging branch, creates or updates the staging PR and closes the
//! forwarding PRs.

use crate::config::LabelConfig;
use crate::error::{Error, Result};
use crate::git::{GitBackend, SubmoduleState, FORK_REMOTE, ORIGIN};
use crate::group::describe::{
    commit_body, created_commit_message, updated_commit_message,
};
use crate::group::{resolve_group, GroupRequest, GroupingContext, Phase, ProgressCallback};
use crate::platform::{parse_repo_info, PlatformService};
use crate::types::{BaseTarget, CloneProtocol, CreatePullRequest, PrRef, PullRequest};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Settings that come from configuration rather than the command line
#[derive(Debug, Clone, Default)]
pub struct GroupSettings {
    /// Workflow labels
    pub labels: LabelConfig,
    /// Protocol for the clone and fork remotes
    pub clone_protocol: CloneProtocol,
}

/// What happened to the staging PR
#[derive(Debug, Clone)]
pub enum PublishOutcome {
    /// A new staging PR was opened
    Created(PullRequest),
    /// The existing staging PR got new commits and a new description
    Updated(PullRequest),
    /// Submodules already matched; nothing was committed
    NoChanges,
    /// Dry run; nothing was modified
    DryRun,
}

/// Result of a grouping run
#[derive(Debug, Clone)]
pub struct GroupResult {
    /// Base the staging PR targets
    pub base: BaseTarget,
    /// Staging branch
    pub branch: String,
    /// Package PRs grouped
    pub packages: Vec<PrRef>,
    /// Description published (or that would be published)
    pub description: String,
    /// Staging PR outcome
    pub outcome: PublishOutcome,
    /// Forwarding PRs that were closed
    pub closed: Vec<PrRef>,
    /// References the forge reported as missing
    pub unresolved: Vec<PrRef>,
}

impl GroupResult {
    /// Turn missing references into an error
    pub fn into_result(self) -> Result<Self> {
        if self.unresolved.is_empty() {
            Ok(self)
        } else {
            Err(Error::Unresolved(
                self.unresolved.iter().map(ToString::to_string).collect(),
            ))
        }
    }
}

/// Where the staging branch is pushed and the PR is opened from
struct PushTarget {
    remote: &'static str,
    owner: String,
    repo: String,
}

/// Run the whole grouping workflow
///
/// Missing references do not fail the run; they are reported in
/// [`GroupResult::unresolved`]. Use [`GroupResult::into_result`] to turn them
/// into an error after reporting.
pub async fn run_group(
    request: &GroupRequest,
    platform: &dyn PlatformService,
    git: &dyn GitBackend,
    settings: &GroupSettings,
    progress: &dyn ProgressCallback,
) -> Result<GroupResult> {
    let mut context = resolve_group(request, platform, &settings.labels, progress).await?;
    let base = context.base()?.clone();

    if request.dry_run {
        progress.on_message("Dry run - no changes will be made").await;
        progress.on_phase(Phase::Complete).await;
        return Ok(GroupResult {
            base,
            branch: context.branch.clone(),
            description: context.description(),
            packages: context.packages,
            outcome: PublishOutcome::DryRun,
            closed: Vec::new(),
            unresolved: context.unresolved,
        });
    }

    progress.on_phase(Phase::PreparingWorkspace).await;
    let clone_dir = prepare_workspace(request, &base, platform, git, settings).await?;

    progress.on_phase(Phase::SyncingSubmodules).await;
    let paths = sync_submodules(&mut context, &clone_dir, platform, git, progress).await?;

    progress.on_phase(Phase::Publishing).await;
    let outcome = publish(request, &context, &clone_dir, &paths, platform, git, settings, progress)
        .await?;

    progress.on_phase(Phase::Closing).await;
    let closed = close_forwarded(&mut context, platform, progress).await?;

    progress.on_phase(Phase::Complete).await;
    Ok(GroupResult {
        base,
        branch: context.branch.clone(),
        description: context.description(),
        packages: context.packages,
        outcome,
        closed,
        unresolved: context.unresolved,
    })
}

/// Clone the project repository or bring an existing clone up to date
///
/// Returns the clone directory, `<workdir>/<owner>_<repo>_<branch>`.
pub async fn prepare_workspace(
    request: &GroupRequest,
    base: &BaseTarget,
    platform: &dyn PlatformService,
    git: &dyn GitBackend,
    settings: &GroupSettings,
) -> Result<PathBuf> {
    if !request.workdir.is_dir() {
        return Err(Error::WorkdirMissing(request.workdir.clone()));
    }

    let clone_dir = request.workdir.join(base.workspace_dir_name());
    info!(dir = %clone_dir.display(), "using working directory");

    let repo = platform.get_repo(&base.owner, &base.repo).await?;
    let url = repo.url_for(settings.clone_protocol);
    git.clone_or_update(url, &base.branch, &clone_dir, ORIGIN)
        .await?;

    Ok(clone_dir)
}

/// Check out the head of every package PR in its submodule
///
/// Returns the submodule paths (relative to the clone) that were updated.
/// Package PRs the forge reports as missing are recorded and skipped.
pub async fn sync_submodules(
    context: &mut GroupingContext,
    clone_dir: &Path,
    platform: &dyn PlatformService,
    git: &dyn GitBackend,
    progress: &dyn ProgressCallback,
) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = Vec::new();

    for package in &context.packages {
        let pr = match platform
            .get_pr(&package.owner, &package.repo, package.number)
            .await
        {
            Ok(pr) => pr,
            Err(e) if e.is_not_found() => {
                debug!(pr = %package, "package PR not found");
                progress.on_not_found(package).await;
                context.unresolved.push(package.clone());
                continue;
            }
            Err(e) => return Err(e),
        };

        progress.on_package(package).await;

        let submodule = clone_dir.join(&package.repo);
        if !submodule.exists() {
            return Err(Error::SubmoduleMissing(submodule));
        }

        if git.submodule_status(clone_dir, &package.repo).await? == SubmoduleState::Uninitialized {
            git.submodule_init(clone_dir, &package.repo).await?;
        }

        git.reset_hard(&submodule).await?;
        let branch = git
            .fetch_pull_request(
                &submodule,
                ORIGIN,
                &platform.pull_request_refspec(package.number),
                package.number,
                &pr.head_sha,
            )
            .await?;
        git.switch(&submodule, &branch).await?;

        let path = PathBuf::from(&package.repo);
        if !paths.contains(&path) {
            paths.push(path);
        }
    }

    Ok(paths)
}

/// Resolve the remote and repository the staging branch is pushed to
async fn push_target(
    request: &GroupRequest,
    base: &BaseTarget,
    clone_dir: &Path,
    platform: &dyn PlatformService,
    git: &dyn GitBackend,
    settings: &GroupSettings,
) -> Result<PushTarget> {
    let Some((owner, name)) = request.fork_repo()? else {
        return Ok(PushTarget {
            remote: ORIGIN,
            owner: base.owner.clone(),
            repo: base.repo.clone(),
        });
    };

    let fork = platform
        .get_repo(owner, name)
        .await
        .map_err(|e| Error::InvalidFork {
            fork: format!("{owner}/{name}"),
            reason: e.to_string(),
        })?;

    match git.remote_url(clone_dir, FORK_REMOTE).await? {
        None => {
            git.add_remote(clone_dir, FORK_REMOTE, fork.url_for(settings.clone_protocol))
                .await?;
        }
        Some(url) => {
            let matches = parse_repo_info(&url)
                .is_ok_and(|loc| loc.owner == owner && loc.repo == name);
            if !matches {
                warn!(%url, owner, repo = name, "existing 'fork' remote points elsewhere");
            }
        }
    }
    git.fetch(clone_dir, FORK_REMOTE).await?;

    Ok(PushTarget {
        remote: FORK_REMOTE,
        owner: owner.to_string(),
        repo: name.to_string(),
    })
}

/// Commit the submodule updates and create or update the staging PR
#[allow(clippy::too_many_arguments)]
pub async fn publish(
    request: &GroupRequest,
    context: &GroupingContext,
    clone_dir: &Path,
    paths: &[PathBuf],
    platform: &dyn PlatformService,
    git: &dyn GitBackend,
    settings: &GroupSettings,
    progress: &dyn ProgressCallback,
) -> Result<PublishOutcome> {
    let base = context.base()?;
    let branch = context.branch.as_str();

    if !paths.is_empty() {
        git.add(clone_dir, paths).await?;
    }
    if paths.is_empty() || !git.has_staged_changes(clone_dir).await? {
        progress.on_message("No new changes to commit").await;
        return Ok(PublishOutcome::NoChanges);
    }

    let target = push_target(request, base, clone_dir, platform, git, settings).await?;
    let body = commit_body(&request.forwarding, &context.closes);
    let description = context.description();

    if let Some(existing) = &context.existing {
        if git.branch_exists(clone_dir, branch).await? {
            let upstream = format!("{}/{branch}", target.remote);
            git.force_branch(clone_dir, branch, &upstream).await?;
            git.checkout(clone_dir, branch).await?;
        } else {
            git.checkout_tracking(clone_dir, target.remote, branch)
                .await?;
        }

        git.commit(clone_dir, &updated_commit_message(&body)).await?;
        git.push(clone_dir, target.remote, branch, request.force)
            .await?;

        info!(pr = %existing.reference(), "updating staging PR description");
        let pr = platform
            .update_pr_body(&existing.owner, &existing.repo, existing.number, &description)
            .await?;
        progress.on_pr_updated(&pr).await;
        return Ok(PublishOutcome::Updated(pr));
    }

    let local = git.branch_exists(clone_dir, branch).await?;
    let remote = git
        .remote_branch_exists(clone_dir, target.remote, branch)
        .await?;
    if local || remote {
        if !request.force {
            return Err(Error::BranchExists(branch.to_string()));
        }
        if local {
            git.delete_branch(clone_dir, branch).await?;
        }
        git.delete_remote_tracking(clone_dir, target.remote, branch)
            .await?;
    }

    git.create_branch(clone_dir, branch).await?;
    git.commit(clone_dir, &created_commit_message(&context.title, &body))
        .await?;
    git.push(clone_dir, target.remote, branch, request.force)
        .await?;

    info!(base = %base, "creating staging PR");
    let pr = platform
        .create_pr(&CreatePullRequest {
            target_owner: base.owner.clone(),
            target_repo: base.repo.clone(),
            target_branch: base.branch.clone(),
            source_owner: target.owner,
            source_repo: target.repo,
            source_branch: branch.to_string(),
            title: context.title.clone(),
            body: description,
        })
        .await?;

    platform
        .add_labels(
            &base.owner,
            &base.repo,
            pr.number,
            &[settings.labels.in_progress.as_str()],
        )
        .await?;

    progress.on_pr_created(&pr).await;
    Ok(PublishOutcome::Created(pr))
}

/// Close every forwarding PR that was processed
///
/// Returns the closed references. Missing PRs are recorded as unresolved.
pub async fn close_forwarded(
    context: &mut GroupingContext,
    platform: &dyn PlatformService,
    progress: &dyn ProgressCallback,
) -> Result<Vec<PrRef>> {
    let mut closed = Vec::with_capacity(context.forwarded.len());

    for reference in &context.forwarded {
        match platform
            .close_pr(&reference.owner, &reference.repo, reference.number)
            .await
        {
            Ok(()) => {
                progress.on_pr_closed(reference).await;
                closed.push(reference.clone());
            }
            Err(e) if e.is_not_found() => {
                progress.on_not_found(reference).await;
                context.unresolved.push(reference.clone());
            }
            Err(e) => return Err(e),
        }
    }

    Ok(closed)
}
