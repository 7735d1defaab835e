//! Authentication for Gitea, GitHub and GitLab
//!
//! Supports CLI-based auth (gh, glab), environment variables and the
//! configuration file.

mod gitea;
mod github;
mod gitlab;

pub use gitea::get_gitea_auth;
pub use github::get_github_auth;
pub use gitlab::get_gitlab_auth;

use std::env;
use tokio::process::Command;
use tracing::debug;

/// Source of authentication token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    /// Token from CLI tool (gh or glab)
    Cli,
    /// Token from environment variable
    EnvVar,
    /// Token from the configuration file
    ConfigFile,
}

/// Resolved credentials for a forge
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Authentication token
    pub token: String,
    /// Where the token was obtained from
    pub source: AuthSource,
}

/// First non-empty value among the given environment variables
fn token_from_env(vars: &[&str]) -> Option<String> {
    vars.iter()
        .filter_map(|var| env::var(var).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

/// Ask a forge CLI (`gh`, `glab`) for its token
///
/// Returns `None` when the tool is missing, not logged in, or prints nothing.
async fn token_from_cli(program: &str, status_args: &[&str], token_args: &[&str]) -> Option<String> {
    let status = Command::new(program).args(status_args).output().await.ok()?;
    if !status.status.success() {
        debug!(program, "CLI not authenticated");
        return None;
    }

    let output = Command::new(program).args(token_args).output().await.ok()?;
    if !output.status.success() {
        return None;
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() { None } else { Some(token) }
}
