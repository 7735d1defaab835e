//! `git` command-line backend

use crate::error::{Error, Result};
use crate::git::{pull_request_branch, GitBackend, SubmoduleState};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::debug;

/// Git backend that runs the `git` executable
#[derive(Debug, Clone)]
pub struct GitCli {
    program: PathBuf,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCli {
    /// Use `git` from `PATH`
    pub fn new() -> Self {
        Self::with_program("git")
    }

    /// Use a specific git executable
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn output(&self, dir: &Path, args: &[&str]) -> Result<Output> {
        debug!(dir = %dir.display(), "git {}", args.join(" "));

        Command::new(&self.program)
            .args(args)
            .current_dir(dir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| Error::Git {
                command: args.join(" "),
                stderr: format!("failed to execute {}: {e}", self.program.display()),
            })
    }

    /// Run a command that must succeed, returning its stdout
    async fn run(&self, dir: &Path, args: &[&str]) -> Result<String> {
        let output = self.output(dir, args).await?;

        if !output.status.success() {
            return Err(Error::Git {
                command: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run a command whose exit status answers a yes/no question
    ///
    /// `no_code` is the exit code meaning "no"; anything else but 0 is a failure.
    async fn probe(&self, dir: &Path, args: &[&str], no_code: i32) -> Result<bool> {
        let output = self.output(dir, args).await?;

        match output.status.code() {
            Some(0) => Ok(true),
            Some(code) if code == no_code => Ok(false),
            _ => Err(Error::Git {
                command: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
        }
    }

    async fn resolve(&self, dir: &Path, rev: &str) -> Result<Option<String>> {
        let spec = format!("{rev}^{{commit}}");
        let output = self
            .output(dir, &["rev-parse", "--verify", "--quiet", &spec])
            .await?;
        Ok(output
            .status
            .success()
            .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string()))
    }
}

#[async_trait]
impl GitBackend for GitCli {
    async fn clone_or_update(
        &self,
        url: &str,
        branch: &str,
        dir: &Path,
        remote: &str,
    ) -> Result<()> {
        if dir.join(".git").exists() {
            self.fetch(dir, remote).await?;
            let start = format!("{remote}/{branch}");
            self.run(dir, &["checkout", "-B", branch, &start]).await?;
            return Ok(());
        }

        let parent = dir
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let target = dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| Error::Git {
                command: "clone".to_string(),
                stderr: format!("invalid clone directory '{}'", dir.display()),
            })?;
        self.run(
            parent,
            &["clone", "--branch", branch, "--origin", remote, url, &target],
        )
        .await?;
        Ok(())
    }

    async fn fetch(&self, dir: &Path, remote: &str) -> Result<()> {
        self.run(dir, &["fetch", remote]).await?;
        Ok(())
    }

    async fn submodule_status(&self, dir: &Path, path: &str) -> Result<SubmoduleState> {
        let stdout = self.run(dir, &["submodule", "status", "--", path]).await?;
        stdout
            .lines()
            .next()
            .and_then(SubmoduleState::from_status_line)
            .ok_or_else(|| Error::Parse(format!("unexpected submodule status for '{path}': {stdout}")))
    }

    async fn submodule_init(&self, dir: &Path, path: &str) -> Result<()> {
        self.run(dir, &["submodule", "update", "--init", "--", path])
            .await?;
        Ok(())
    }

    async fn reset_hard(&self, dir: &Path) -> Result<()> {
        self.run(dir, &["reset", "--hard"]).await?;
        Ok(())
    }

    async fn fetch_pull_request(
        &self,
        dir: &Path,
        remote: &str,
        refspec: &str,
        number: u64,
        commit: &str,
    ) -> Result<String> {
        let branch = pull_request_branch(number);
        let local_ref = format!("refs/heads/{branch}");
        let mapping = format!("+{refspec}:{local_ref}");

        self.run(
            dir,
            &["fetch", "--force", "--update-head-ok", remote, &mapping],
        )
        .await?;

        if commit.is_empty() {
            return Ok(branch);
        }

        let fetched = self.resolve(dir, &local_ref).await?;
        if fetched.as_deref() != Some(commit) {
            // The forge may report a head the pull ref no longer points at
            if self.resolve(dir, commit).await?.is_none() {
                self.run(dir, &["fetch", remote, commit]).await?;
            }
            self.run(dir, &["update-ref", &local_ref, commit]).await?;
        }

        Ok(branch)
    }

    async fn switch(&self, dir: &Path, branch: &str) -> Result<()> {
        self.run(dir, &["checkout", "--force", branch]).await?;
        Ok(())
    }

    async fn checkout(&self, dir: &Path, branch: &str) -> Result<()> {
        self.run(dir, &["checkout", branch]).await?;
        Ok(())
    }

    async fn checkout_tracking(&self, dir: &Path, remote: &str, branch: &str) -> Result<()> {
        let upstream = format!("{remote}/{branch}");
        self.run(dir, &["checkout", "-b", branch, "--track", &upstream])
            .await?;
        Ok(())
    }

    async fn create_branch(&self, dir: &Path, branch: &str) -> Result<()> {
        self.run(dir, &["checkout", "-b", branch]).await?;
        Ok(())
    }

    async fn force_branch(&self, dir: &Path, branch: &str, start: &str) -> Result<()> {
        self.run(dir, &["branch", "--force", branch, start]).await?;
        Ok(())
    }

    async fn add(&self, dir: &Path, paths: &[PathBuf]) -> Result<()> {
        let paths: Vec<String> = paths
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        let mut args = vec!["add", "--"];
        args.extend(paths.iter().map(String::as_str));
        self.run(dir, &args).await?;
        Ok(())
    }

    async fn has_staged_changes(&self, dir: &Path) -> Result<bool> {
        // `--quiet` exits 1 when there are differences
        self.probe(dir, &["diff", "--cached", "--quiet"], 1)
            .await
            .map(|unchanged| !unchanged)
    }

    async fn commit(&self, dir: &Path, message: &str) -> Result<()> {
        self.run(dir, &["commit", "-m", message]).await?;
        Ok(())
    }

    async fn push(&self, dir: &Path, remote: &str, branch: &str, force: bool) -> Result<()> {
        let mut args = vec!["push", "--set-upstream"];
        if force {
            args.push("--force");
        }
        args.extend([remote, branch]);
        self.run(dir, &args).await?;
        Ok(())
    }

    async fn add_remote(&self, dir: &Path, name: &str, url: &str) -> Result<()> {
        self.run(dir, &["remote", "add", name, url]).await?;
        Ok(())
    }

    async fn remote_url(&self, dir: &Path, name: &str) -> Result<Option<String>> {
        let output = self.output(dir, &["remote", "get-url", name]).await?;
        if !output.status.success() {
            return Ok(None);
        }
        let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((!url.is_empty()).then_some(url))
    }

    async fn branch_exists(&self, dir: &Path, branch: &str) -> Result<bool> {
        let local_ref = format!("refs/heads/{branch}");
        self.probe(dir, &["rev-parse", "--verify", "--quiet", &local_ref], 1)
            .await
    }

    async fn remote_branch_exists(&self, dir: &Path, remote: &str, branch: &str) -> Result<bool> {
        // Patterns match ref name tails, so `staging` alone would also match
        // `refs/heads/team/staging`. `--exit-code` exits 2 when nothing matched.
        let head_ref = format!("refs/heads/{branch}");
        self.probe(dir, &["ls-remote", "--exit-code", "--heads", remote, &head_ref], 2)
            .await
    }

    async fn delete_branch(&self, dir: &Path, branch: &str) -> Result<()> {
        self.run(dir, &["branch", "-D", branch]).await?;
        Ok(())
    }

    async fn delete_remote_tracking(&self, dir: &Path, remote: &str, branch: &str) -> Result<()> {
        let tracking = format!("{remote}/{branch}");
        let tracking_ref = format!("refs/remotes/{tracking}");
        if self.resolve(dir, &tracking_ref).await?.is_none() {
            debug!(%tracking, "no remote-tracking ref to delete");
            return Ok(());
        }
        self.run(dir, &["branch", "-D", "-r", &tracking]).await?;
        Ok(())
    }
}
