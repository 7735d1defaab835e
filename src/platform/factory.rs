//! Platform service factory
//!
//! Creates platform services based on configuration.

use crate::auth::{get_gitea_auth, get_github_auth, get_gitlab_auth, AuthConfig, AuthSource};
use crate::error::{Error, Result};
use crate::platform::{GitHubService, GitLabService, GiteaService, PlatformService};
use crate::types::{Platform, PlatformConfig};

/// Turn a configured host into an API base URL
///
/// Hosts given with a scheme are used as-is, bare hostnames get `https://`.
pub fn base_url(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

/// Resolve the credentials for a platform
///
/// The configuration file token is the last resort on every platform.
pub async fn resolve_auth(
    config: &PlatformConfig,
    config_token: Option<&str>,
) -> Result<AuthConfig> {
    let found = match config.platform {
        Platform::Gitea => return get_gitea_auth(config_token),
        Platform::GitHub => get_github_auth(config.host.as_deref()).await,
        Platform::GitLab => get_gitlab_auth(config.host.as_deref()).await,
    };

    match (found, config_token.map(str::trim).filter(|t| !t.is_empty())) {
        (Err(Error::Auth(_)), Some(token)) => Ok(AuthConfig {
            token: token.to_string(),
            source: AuthSource::ConfigFile,
        }),
        (found, _) => found,
    }
}

/// Create a platform service from configuration
///
/// Handles authentication and client construction for all three platforms.
pub async fn create_platform_service(
    config: &PlatformConfig,
    config_token: Option<&str>,
) -> Result<Box<dyn PlatformService>> {
    let auth = resolve_auth(config, config_token).await?;
    build_service(config, &auth.token)
}

/// Construct the service for a platform from an already resolved token
pub fn build_service(config: &PlatformConfig, token: &str) -> Result<Box<dyn PlatformService>> {
    match config.platform {
        Platform::Gitea => {
            let host = config
                .host
                .as_deref()
                .ok_or_else(|| Error::Config("a host is required for Gitea".to_string()))?;
            Ok(Box::new(GiteaService::new(token, &base_url(host))?))
        }
        Platform::GitHub => Ok(Box::new(GitHubService::new(token, config.host.clone())?)),
        Platform::GitLab => {
            let url = config.host.as_deref().map(base_url);
            Ok(Box::new(GitLabService::new(
                token.to_string(),
                url.as_deref(),
            )?))
        }
    }
}
