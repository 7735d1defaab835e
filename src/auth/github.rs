//! GitHub authentication

use crate::auth::{token_from_cli, token_from_env, AuthConfig, AuthSource};
use crate::error::{Error, Result};

/// Get GitHub authentication
///
/// Priority:
/// 1. gh CLI (`gh auth token`)
/// 2. `GITHUB_TOKEN` environment variable
/// 3. `GH_TOKEN` environment variable
pub async fn get_github_auth(host: Option<&str>) -> Result<AuthConfig> {
    let mut status_args = vec!["auth", "status"];
    let mut token_args = vec!["auth", "token"];
    if let Some(h) = host {
        status_args.extend(["--hostname", h]);
        token_args.extend(["--hostname", h]);
    }

    if let Some(token) = token_from_cli("gh", &status_args, &token_args).await {
        return Ok(AuthConfig {
            token,
            source: AuthSource::Cli,
        });
    }

    if let Some(token) = token_from_env(&["GITHUB_TOKEN", "GH_TOKEN"]) {
        return Ok(AuthConfig {
            token,
            source: AuthSource::EnvVar,
        });
    }

    Err(Error::Auth(
        "No GitHub authentication found. Run `gh auth login` or set GITHUB_TOKEN".to_string(),
    ))
}
