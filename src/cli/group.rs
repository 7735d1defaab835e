//! Group command - collect forwarded PRs into a staging PR

use crate::cli::progress::CliProgress;
use crate::cli::style::{bullet, check, hyperlink_url, Stream, Stylize};
use crate::cli::GlobalOptions;
use anstream::println;
use git_staging::error::Result;
use git_staging::git::GitCli;
use git_staging::group::{self, GroupRequest, GroupResult, GroupSettings, PublishOutcome};
use git_staging::platform::create_platform_service;

/// Run the group command
pub async fn run_group(options: &GlobalOptions, request: &GroupRequest) -> Result<()> {
    // Argument errors surface before any config or network access
    request.validate()?;

    let (config, platform_config) = options.resolve()?;
    let platform = create_platform_service(&platform_config, config.token.as_deref()).await?;

    let settings = GroupSettings {
        labels: config.labels.clone(),
        clone_protocol: config.clone_protocol,
    };
    let git = GitCli::new();
    let progress = CliProgress;

    let result =
        group::run_group(request, platform.as_ref(), &git, &settings, &progress).await?;

    print_summary(&result);
    result.into_result()?;
    Ok(())
}

fn print_summary(result: &GroupResult) {
    println!();
    match &result.outcome {
        PublishOutcome::DryRun => {
            println!(
                "Would group {} package PRs into {} on {}",
                result.packages.len().accent(),
                result.branch.emphasis(),
                result.base.accent()
            );
            for package in &result.packages {
                println!("  {} {}", bullet(), package);
            }
            println!();
            println!("{}", "Description:".emphasis());
            for line in result.description.lines() {
                println!("  {}", line.muted());
            }
        }
        PublishOutcome::Created(pr) | PublishOutcome::Updated(pr) => {
            println!(
                "{} Staging PR {} on {}",
                check(),
                format!("#{}", pr.number).accent(),
                result.base.accent()
            );
            println!("  {}", hyperlink_url(Stream::Stdout, &pr.html_url));
        }
        PublishOutcome::NoChanges => {
            println!("{}", "Staging branch already up to date".muted());
        }
    }

    if !result.closed.is_empty() {
        println!(
            "Closed {} forwarded PR{}",
            result.closed.len().accent(),
            if result.closed.len() == 1 { "" } else { "s" }
        );
    }
}
