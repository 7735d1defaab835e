//! Configuration file loading
//!
//! The file is optional. Values given on the command line take precedence
//! over everything read here.

use crate::error::{Error, Result};
use crate::platform::detect_platform;
use crate::types::{CloneProtocol, Platform, PlatformConfig};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory name under the user config dir
const CONFIG_DIR: &str = "git-staging";

/// Filename of the configuration file
const CONFIG_FILE: &str = "config.toml";

/// Label marking a forwarding PR as ready for grouping
pub const BACKLOG_LABEL: &str = "staging_backlog";

/// Label attached to newly created staging PRs
pub const IN_PROGRESS_LABEL: &str = "staging_inprogress";

/// Labels used by the grouping workflow
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Label required on forwarding PRs
    pub backlog: String,
    /// Label attached to new staging PRs
    pub in_progress: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            backlog: BACKLOG_LABEL.to_string(),
            in_progress: IN_PROGRESS_LABEL.to_string(),
        }
    }
}

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Forge platform
    pub platform: Option<Platform>,
    /// Forge host, bare (`src.example.org`) or as a URL
    pub host: Option<String>,
    /// API token, used when no other credential source provides one
    pub token: Option<String>,
    /// Protocol for cloning the project and adding the fork remote
    pub clone_protocol: CloneProtocol,
    /// Workflow labels
    pub labels: LabelConfig,
}

/// Default location of the configuration file
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

impl Config {
    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load the configuration
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// used if present, and defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) if p.exists() => p,
                _ => {
                    debug!("no config file, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        debug!(path = %path.display(), "loading config");
        let content = fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;

        Self::parse(&content)
            .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))
    }

    /// Decide which forge to talk to
    ///
    /// Command-line values win over the file. Without an explicit platform it
    /// is detected from the host, and hosts that are neither GitHub nor
    /// GitLab are taken to be Gitea instances.
    pub fn resolve_platform(
        &self,
        cli_platform: Option<Platform>,
        cli_host: Option<&str>,
    ) -> Result<PlatformConfig> {
        let host = cli_host
            .map(ToString::to_string)
            .or_else(|| self.host.clone())
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty());

        let platform = cli_platform
            .or(self.platform)
            .or_else(|| {
                host.as_deref()
                    .map(|h| detect_platform(h).unwrap_or(Platform::Gitea))
            })
            .unwrap_or(Platform::Gitea);

        if platform == Platform::Gitea && host.is_none() {
            return Err(Error::Config(
                "a host is required for Gitea: pass --host or set `host` in the config file"
                    .to_string(),
            ));
        }

        debug!(%platform, ?host, "resolved platform");
        Ok(PlatformConfig {
            platform,
            host: host.filter(|h| !is_public_host(h)),
        })
    }
}

/// github.com and gitlab.com are the services' defaults and need no host
fn is_public_host(host: &str) -> bool {
    let bare = host.split_once("://").map_or(host, |(_, rest)| rest);
    let name = bare.split(['/', ':']).next().unwrap_or_default();
    matches!(name, "github.com" | "gitlab.com")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.labels.backlog, "staging_backlog");
        assert_eq!(config.labels.in_progress, "staging_inprogress");
        assert_eq!(config.clone_protocol, CloneProtocol::Ssh);
    }

    #[test]
    fn test_full_config() {
        let config = Config::parse(
            r#"
platform = "gitea"
host = "src.example.org"
token = "abc"
clone_protocol = "https"

[labels]
backlog = "ready"
"#,
        )
        .unwrap();

        assert_eq!(config.platform, Some(Platform::Gitea));
        assert_eq!(config.host.as_deref(), Some("src.example.org"));
        assert_eq!(config.token.as_deref(), Some("abc"));
        assert_eq!(config.clone_protocol, CloneProtocol::Https);
        assert_eq!(config.labels.backlog, "ready");
        assert_eq!(config.labels.in_progress, "staging_inprogress");
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(Config::parse("hots = \"typo\"").is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_resolve_cli_overrides_file() {
        let config = Config {
            platform: Some(Platform::GitLab),
            host: Some("gitlab.example.org".to_string()),
            ..Config::default()
        };
        let resolved = config
            .resolve_platform(Some(Platform::Gitea), Some("src.example.org"))
            .unwrap();
        assert_eq!(resolved.platform, Platform::Gitea);
        assert_eq!(resolved.host.as_deref(), Some("src.example.org"));
    }

    #[test]
    fn test_resolve_detects_public_hosts() {
        let config = Config::default();
        let resolved = config.resolve_platform(None, Some("github.com")).unwrap();
        assert_eq!(resolved.platform, Platform::GitHub);
        assert_eq!(resolved.host, None);

        let resolved = config
            .resolve_platform(None, Some("https://gitlab.com"))
            .unwrap();
        assert_eq!(resolved.platform, Platform::GitLab);
        assert_eq!(resolved.host, None);
    }

    #[test]
    fn test_resolve_unknown_host_is_gitea() {
        let config = Config {
            host: Some("src.example.org".to_string()),
            ..Config::default()
        };
        let resolved = config.resolve_platform(None, None).unwrap();
        assert_eq!(resolved.platform, Platform::Gitea);
        assert_eq!(resolved.host.as_deref(), Some("src.example.org"));
    }

    #[test]
    fn test_resolve_gitea_requires_host() {
        let err = Config::default().resolve_platform(None, None).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_resolve_github_without_host() {
        let resolved = Config::default()
            .resolve_platform(Some(Platform::GitHub), None)
            .unwrap();
        assert_eq!(resolved.platform, Platform::GitHub);
        assert_eq!(resolved.host, None);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "platform = \"github\"\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.platform, Some(Platform::GitHub));
    }
}
