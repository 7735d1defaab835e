//! Gitea authentication

use crate::auth::{token_from_env, AuthConfig, AuthSource};
use crate::error::{Error, Result};

/// Get Gitea authentication
///
/// Priority:
/// 1. `GITEA_TOKEN` environment variable
/// 2. `token` from the configuration file
pub fn get_gitea_auth(config_token: Option<&str>) -> Result<AuthConfig> {
    if let Some(token) = token_from_env(&["GITEA_TOKEN"]) {
        return Ok(AuthConfig {
            token,
            source: AuthSource::EnvVar,
        });
    }

    if let Some(token) = config_token.map(str::trim).filter(|t| !t.is_empty()) {
        return Ok(AuthConfig {
            token: token.to_string(),
            source: AuthSource::ConfigFile,
        });
    }

    Err(Error::Auth(
        "No Gitea authentication found. Set GITEA_TOKEN or `token` in the config file"
            .to_string(),
    ))
}
