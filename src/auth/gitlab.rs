//! GitLab authentication

use crate::auth::{token_from_cli, token_from_env, AuthConfig, AuthSource};
use crate::error::{Error, Result};

/// Get GitLab authentication for a host (`gitlab.com` when `None`)
///
/// Priority:
/// 1. glab CLI (`glab auth token`)
/// 2. `GITLAB_TOKEN` environment variable
/// 3. `GL_TOKEN` environment variable
pub async fn get_gitlab_auth(host: Option<&str>) -> Result<AuthConfig> {
    let host = host.unwrap_or("gitlab.com");

    if let Some(token) = token_from_cli(
        "glab",
        &["auth", "status", "--hostname", host],
        &["auth", "token", "--hostname", host],
    )
    .await
    {
        return Ok(AuthConfig {
            token,
            source: AuthSource::Cli,
        });
    }

    if let Some(token) = token_from_env(&["GITLAB_TOKEN", "GL_TOKEN"]) {
        return Ok(AuthConfig {
            token,
            source: AuthSource::EnvVar,
        });
    }

    Err(Error::Auth(
        "No GitLab authentication found. Run `glab auth login` or set GITLAB_TOKEN".to_string(),
    ))
}
