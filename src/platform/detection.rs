//! Platform detection from hosts and remote URLs

use crate::error::{Error, Result};
use crate::types::Platform;
use regex::Regex;
use std::env;
use std::sync::OnceLock;

/// Owner/repo location parsed from a git remote URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLocation {
    /// Hostname of the remote
    pub host: Option<String>,
    /// Repository owner (may contain `/` for nested groups)
    pub owner: String,
    /// Repository name, without `.git`
    pub repo: String,
}

/// Detect the platform serving a host
///
/// Accepts a bare hostname or a URL. Returns `None` for hosts that are not
/// recognizably GitHub, GitLab or a configured Gitea instance.
pub fn detect_platform(host: &str) -> Option<Platform> {
    let gh_host = env::var("GH_HOST").ok();
    let gitlab_host = env::var("GITLAB_HOST").ok();
    let gitea_host = env::var("GITEA_HOST").ok();

    let hostname = extract_hostname(host).unwrap_or_else(|| host.to_string());

    // Check GitHub
    if hostname == "github.com"
        || hostname.ends_with(".github.com")
        || gh_host.as_ref().is_some_and(|h| hostname == *h)
    {
        return Some(Platform::GitHub);
    }

    // Check GitLab
    if hostname == "gitlab.com"
        || hostname.ends_with(".gitlab.com")
        || gitlab_host.as_ref().is_some_and(|h| hostname == *h)
    {
        return Some(Platform::GitLab);
    }

    if gitea_host.as_ref().is_some_and(|h| hostname == *h) {
        return Some(Platform::Gitea);
    }

    None
}

fn remote_patterns() -> &'static (Regex, Regex) {
    static PATTERNS: OnceLock<(Regex, Regex)> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        (
            // SSH format: git@host:owner/repo.git or ssh://git@host[:port]/owner/repo.git
            Regex::new(r"^(?:ssh://)?[^@/]+@[^:/]+(?::\d+)?[:/](.+?)(?:\.git)?/?$")
                .expect("hardcoded ssh remote pattern is valid"),
            // HTTPS format: https://host/owner/repo.git
            Regex::new(r"^(?:https?|file)://[^/]*/(.+?)(?:\.git)?/?$")
                .expect("hardcoded https remote pattern is valid"),
        )
    })
}

/// Parse repository info (owner/repo) from a remote URL
pub fn parse_repo_info(url: &str) -> Result<RepoLocation> {
    let (re_ssh, re_https) = remote_patterns();

    let path = re_ssh
        .captures(url)
        .or_else(|| re_https.captures(url))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| Error::Parse(format!("cannot parse remote URL: {url}")))?;

    // Split path into owner and repo (GitLab supports nested groups)
    let (owner, repo) = path
        .rsplit_once('/')
        .filter(|(owner, repo)| !owner.is_empty() && !repo.is_empty())
        .ok_or_else(|| Error::Parse(format!("invalid repo path: {path}")))?;

    Ok(RepoLocation {
        host: extract_hostname(url),
        owner: owner.to_string(),
        repo: repo.to_string(),
    })
}

fn extract_hostname(url: &str) -> Option<String> {
    // SCP-like SSH format
    if let Some(rest) = url.strip_prefix("git@") {
        return rest
            .split([':', '/'])
            .next()
            .filter(|h| !h.is_empty())
            .map(ToString::to_string);
    }

    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(ToString::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_github_host() {
        assert_eq!(detect_platform("github.com"), Some(Platform::GitHub));
        assert_eq!(
            detect_platform("https://github.com/owner/repo.git"),
            Some(Platform::GitHub)
        );
    }

    #[test]
    fn test_detect_gitlab_host() {
        assert_eq!(detect_platform("gitlab.com"), Some(Platform::GitLab));
        assert_eq!(
            detect_platform("git@gitlab.com:owner/repo.git"),
            Some(Platform::GitLab)
        );
    }

    #[test]
    fn test_detect_unknown_host() {
        assert_eq!(detect_platform("src.example.org"), None);
    }

    #[test]
    fn test_parse_ssh_remote() {
        let loc = parse_repo_info("git@src.example.org:myuser/project.git").unwrap();
        assert_eq!(loc.host.as_deref(), Some("src.example.org"));
        assert_eq!(loc.owner, "myuser");
        assert_eq!(loc.repo, "project");
    }

    #[test]
    fn test_parse_ssh_url_remote_with_port() {
        let loc = parse_repo_info("ssh://gitea@src.example.org:3022/myuser/project.git").unwrap();
        assert_eq!(loc.host.as_deref(), Some("src.example.org"));
        assert_eq!(loc.owner, "myuser");
        assert_eq!(loc.repo, "project");
    }

    #[test]
    fn test_parse_https_remote() {
        let loc = parse_repo_info("https://github.com/owner/repo.git").unwrap();
        assert_eq!(loc.host.as_deref(), Some("github.com"));
        assert_eq!(loc.owner, "owner");
        assert_eq!(loc.repo, "repo");
    }

    #[test]
    fn test_parse_gitlab_nested_groups() {
        let loc = parse_repo_info("https://gitlab.com/group/subgroup/repo.git").unwrap();
        assert_eq!(loc.owner, "group/subgroup");
        assert_eq!(loc.repo, "repo");
    }

    #[test]
    fn test_parse_rejects_bare_path() {
        assert!(parse_repo_info("not a url").is_err());
    }
}
