//! Phase 1: Resolution
//!
//! Loads the existing grouped PR (if any) and every forwarding PR, checks
//! they agree on one base, and collects the package PRs and annotations the
//! staging PR will carry. Nothing on disk or on the forge is modified here.

use crate::config::LabelConfig;
use crate::error::{Error, Result};
use crate::group::describe::{build_description, closes_annotation};
use crate::group::references::{parse_closes, parse_pr_references};
use crate::group::{Phase, ProgressCallback};
use crate::platform::PlatformService;
use crate::types::{split_repo_path, BaseTarget, PrRef, PullRequest};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info};

/// Everything a `group` invocation was asked to do
#[derive(Debug, Clone, Default)]
pub struct GroupRequest {
    /// Forwarding PRs to group, in the order given
    pub forwarding: Vec<PrRef>,
    /// Title of a new staging PR (replaced by the grouped PR's title)
    pub title: String,
    /// Branch for a new staging PR
    pub branch: Option<String>,
    /// Existing staging PR to add to
    pub grouped_pr: Option<PrRef>,
    /// Directory holding the project clone
    pub workdir: PathBuf,
    /// Repository to push the staging branch to, `owner/repo`
    pub fork: Option<String>,
    /// Skip the backlog label check and overwrite existing branches
    pub force: bool,
    /// Stop after resolution
    pub dry_run: bool,
}

impl GroupRequest {
    /// Check the request for conflicting or missing arguments
    ///
    /// Runs before anything talks to the network.
    pub fn validate(&self) -> Result<()> {
        match (&self.grouped_pr, &self.branch) {
            (Some(_), Some(_)) => {
                return Err(Error::Usage(
                    "--branch cannot be used with --grouped-pr".to_string(),
                ));
            }
            (None, None) => {
                return Err(Error::Usage(
                    "--branch is required for a new grouped PR".to_string(),
                ));
            }
            (None, Some(branch)) if branch.trim().is_empty() => {
                return Err(Error::Usage("--branch must not be empty".to_string()));
            }
            _ => {}
        }

        if self.forwarding.is_empty() {
            return Err(Error::Usage(
                "at least one forwarded PR is required".to_string(),
            ));
        }

        self.fork_repo()?;
        Ok(())
    }

    /// Owner and name of the fork, if one was requested
    pub fn fork_repo(&self) -> Result<Option<(&str, &str)>> {
        let Some(fork) = self.fork.as_deref() else {
            return Ok(None);
        };
        split_repo_path(fork)
            .map(Some)
            .ok_or_else(|| Error::InvalidFork {
                fork: fork.to_string(),
                reason: "expected owner/repo".to_string(),
            })
    }
}

/// In-memory state of one grouping run
#[derive(Debug, Clone, Default)]
pub struct GroupingContext {
    /// Base every participating PR targets
    pub base: Option<BaseTarget>,
    /// Package PRs, sorted and deduplicated once resolution finishes
    pub packages: Vec<PrRef>,
    /// `Closes:` annotations, sorted and deduplicated once resolution finishes
    pub closes: Vec<String>,
    /// Staging PR being added to
    pub existing: Option<PullRequest>,
    /// Effective staging PR title
    pub title: String,
    /// Effective staging branch
    pub branch: String,
    /// Forwarding PRs that were loaded and validated
    pub forwarded: Vec<PrRef>,
    /// References the forge reported as missing
    pub unresolved: Vec<PrRef>,
}

impl GroupingContext {
    /// The established base
    pub fn base(&self) -> Result<&BaseTarget> {
        self.base
            .as_ref()
            .ok_or_else(|| Error::Internal("base not resolved".to_string()))
    }

    /// Description the staging PR will carry
    pub fn description(&self) -> String {
        build_description(&self.packages, &self.closes)
    }

    /// Record a base, failing if it differs from the one already established
    fn establish_base(&mut self, reference: &PrRef, found: BaseTarget) -> Result<()> {
        match &self.base {
            None => {
                debug!(base = %found, "base established");
                self.base = Some(found);
                Ok(())
            }
            Some(expected) if *expected == found => Ok(()),
            Some(expected) => Err(Error::BaseMismatch {
                reference: reference.to_string(),
                expected: expected.to_string(),
                found: found.to_string(),
            }),
        }
    }

    fn finish(&mut self) {
        self.packages.sort();
        self.packages.dedup();
        self.closes.sort();
        self.closes.dedup();
    }
}

/// Load the staging PR being added to
async fn load_grouped_pr(
    reference: &PrRef,
    platform: &dyn PlatformService,
    context: &mut GroupingContext,
) -> Result<()> {
    let pr = platform
        .get_pr(&reference.owner, &reference.repo, reference.number)
        .await
        .map_err(|e| Error::GroupedPr {
            reference: reference.to_string(),
            reason: e.to_string(),
        })?;

    info!(pr = %reference, branch = %pr.head_ref, "adding to existing staging PR");

    context.base = Some(pr.base());
    context.packages.extend(parse_pr_references(&pr.body));
    context.closes.extend(parse_closes(&pr.body));
    context.branch.clone_from(&pr.head_ref);
    context.title.clone_from(&pr.title);
    context.existing = Some(pr);
    Ok(())
}

/// Resolve a grouping request against the forge
///
/// A forwarding PR the forge reports as missing is recorded in
/// [`GroupingContext::unresolved`] and skipped; every other failure aborts.
pub async fn resolve_group(
    request: &GroupRequest,
    platform: &dyn PlatformService,
    labels: &LabelConfig,
    progress: &dyn ProgressCallback,
) -> Result<GroupingContext> {
    request.validate()?;
    progress.on_phase(Phase::Resolving).await;

    let mut context = GroupingContext {
        title: request.title.clone(),
        ..GroupingContext::default()
    };

    if let Some(grouped) = &request.grouped_pr {
        load_grouped_pr(grouped, platform, &mut context).await?;
    } else {
        context.branch = request
            .branch
            .clone()
            .ok_or_else(|| Error::Usage("--branch is required for a new grouped PR".to_string()))?;
    }

    let mut seen = HashSet::new();
    for reference in &request.forwarding {
        if !seen.insert(reference) {
            continue;
        }

        let pr = match platform
            .get_pr(&reference.owner, &reference.repo, reference.number)
            .await
        {
            Ok(pr) => pr,
            Err(e) if e.is_not_found() => {
                debug!(pr = %reference, "forwarded PR not found");
                progress.on_not_found(reference).await;
                context.unresolved.push(reference.clone());
                continue;
            }
            Err(e) => return Err(e),
        };

        context.establish_base(reference, pr.base())?;

        if !request.force && !pr.has_label(&labels.backlog) {
            return Err(Error::MissingLabel {
                reference: reference.to_string(),
                label: labels.backlog.clone(),
            });
        }

        let packages = parse_pr_references(&pr.body);
        if packages.is_empty() {
            return Err(Error::NoPackageReferences(reference.to_string()));
        }

        context
            .closes
            .extend(packages.iter().map(|p| closes_annotation(reference, p)));
        context.packages.extend(packages.iter().cloned());
        context.forwarded.push(reference.clone());
        progress.on_forwarded(&pr, &packages).await;
    }

    if context.base.is_none() {
        return Err(Error::Unresolved(
            context.unresolved.iter().map(ToString::to_string).collect(),
        ));
    }

    context.finish();
    info!(
        packages = context.packages.len(),
        forwarded = context.forwarded.len(),
        "resolved staging group"
    );
    Ok(context)
}
