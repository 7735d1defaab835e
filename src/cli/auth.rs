//! Auth command - test and explain authentication

use crate::cli::style::{check, Stylize};
use crate::cli::GlobalOptions;
use anstream::println;
use git_staging::error::Result;
use git_staging::platform::{build_service, resolve_auth};
use git_staging::types::Platform;

/// Run the auth test command
pub async fn run_auth_test(options: &GlobalOptions) -> Result<()> {
    let (config, platform_config) = options.resolve()?;

    println!("Testing {} authentication...", platform_config.platform);
    let auth = resolve_auth(&platform_config, config.token.as_deref()).await?;
    let service = build_service(&platform_config, &auth.token)?;
    let username = service.current_user().await?;

    println!("{} Authenticated as: {}", check(), username.accent());
    println!("Token source: {}", format!("{:?}", auth.source).muted());
    if let Some(host) = &platform_config.host {
        println!("Host: {}", host.accent());
    }
    Ok(())
}

/// Run the auth setup command (show instructions)
pub fn run_auth_setup(options: &GlobalOptions) {
    let platform = options
        .resolve()
        .map_or(Platform::Gitea, |(_, config)| config.platform);

    let title = format!("{platform} Authentication Setup");
    println!("{}", title.emphasis());
    println!("{}", "=".repeat(title.len()));
    println!();

    match platform {
        Platform::Gitea => {
            println!("Option 1: Environment variable");
            println!("  Set {}", "GITEA_TOKEN".accent());
            println!();
            println!("Option 2: Configuration file");
            println!("  Set {} in config.toml", "token".accent());
            println!();
            println!("The Gitea host is required:");
            println!("  Pass --host or set {} in config.toml", "host".accent());
        }
        Platform::GitHub => {
            println!("Option 1: GitHub CLI (recommended)");
            println!("  Install: https://cli.github.com/");
            println!("  Run: {}", "gh auth login".accent());
            println!();
            println!("Option 2: Environment variable");
            println!("  Set {} or {}", "GITHUB_TOKEN".accent(), "GH_TOKEN".accent());
            println!();
            println!("For GitHub Enterprise:");
            println!("  Pass --host with your instance hostname");
        }
        Platform::GitLab => {
            println!("Option 1: GitLab CLI (glab)");
            println!("  Install: https://gitlab.com/gitlab-org/cli");
            println!("  Run: {}", "glab auth login".accent());
            println!();
            println!("Option 2: Environment variable");
            println!("  Set {} or {}", "GITLAB_TOKEN".accent(), "GL_TOKEN".accent());
            println!();
            println!("For self-hosted GitLab:");
            println!("  Pass --host with your instance hostname");
        }
    }
}
