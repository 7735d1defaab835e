//! Mock git backend for testing

#![allow(dead_code)]

use async_trait::async_trait;
use git_staging::error::{Error, Result};
use git_staging::git::{pull_request_branch, GitBackend, SubmoduleState};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Recording git backend
///
/// Every call is recorded as `"<operation> <dir name> <args...>"`, where
/// `<dir name>` is the last component of the directory operated on.
/// `clone_or_update` creates the clone directory plus one subdirectory per
/// configured submodule, so the orchestration finds them on disk.
pub struct MockGit {
    calls: Mutex<Vec<String>>,
    submodules: Vec<String>,
    submodule_states: Mutex<HashMap<String, SubmoduleState>>,
    local_branches: Mutex<HashSet<String>>,
    remote_branches: Mutex<HashSet<(String, String)>>,
    remotes: Mutex<HashMap<String, String>>,
    staged_changes: Mutex<bool>,
    fail_on: Mutex<Option<String>>,
}

fn dir_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl MockGit {
    /// Mock whose clones contain the given submodule directories
    pub fn with_submodules(submodules: &[&str]) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            submodules: submodules.iter().map(ToString::to_string).collect(),
            submodule_states: Mutex::new(HashMap::new()),
            local_branches: Mutex::new(HashSet::new()),
            remote_branches: Mutex::new(HashSet::new()),
            remotes: Mutex::new(HashMap::new()),
            staged_changes: Mutex::new(true),
            fail_on: Mutex::new(None),
        }
    }

    // === Setup ===

    pub fn set_submodule_state(&self, path: &str, state: SubmoduleState) {
        self.submodule_states
            .lock()
            .unwrap()
            .insert(path.to_string(), state);
    }

    pub fn add_local_branch(&self, branch: &str) {
        self.local_branches
            .lock()
            .unwrap()
            .insert(branch.to_string());
    }

    pub fn add_remote_branch(&self, remote: &str, branch: &str) {
        self.remote_branches
            .lock()
            .unwrap()
            .insert((remote.to_string(), branch.to_string()));
    }

    pub fn set_remote(&self, name: &str, url: &str) {
        self.remotes
            .lock()
            .unwrap()
            .insert(name.to_string(), url.to_string());
    }

    pub fn set_staged_changes(&self, staged: bool) {
        *self.staged_changes.lock().unwrap() = staged;
    }

    /// Make the first call of an operation fail
    pub fn fail_on(&self, operation: &str) {
        *self.fail_on.lock().unwrap() = Some(operation.to_string());
    }

    // === Call verification ===

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls of one operation, without the operation name
    pub fn calls_to(&self, operation: &str) -> Vec<String> {
        let prefix = format!("{operation} ");
        self.calls()
            .iter()
            .filter_map(|c| c.strip_prefix(&prefix).map(ToString::to_string))
            .collect()
    }

    pub fn assert_called(&self, call: &str) {
        let calls = self.calls();
        assert!(
            calls.iter().any(|c| c == call),
            "Expected git call `{call}` but got: {calls:#?}"
        );
    }

    pub fn assert_not_called(&self, operation: &str) {
        let calls = self.calls_to(operation);
        assert!(calls.is_empty(), "Unexpected {operation} calls: {calls:#?}");
    }

    fn record(&self, operation: &str, dir: &Path, args: &[&str]) -> Result<()> {
        let mut call = format!("{operation} {}", dir_name(dir));
        for arg in args {
            call.push(' ');
            call.push_str(arg);
        }
        self.calls.lock().unwrap().push(call);

        let mut fail_on = self.fail_on.lock().unwrap();
        if fail_on.as_deref() == Some(operation) {
            *fail_on = None;
            return Err(Error::Git {
                command: operation.to_string(),
                stderr: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl GitBackend for MockGit {
    async fn clone_or_update(
        &self,
        url: &str,
        branch: &str,
        dir: &Path,
        remote: &str,
    ) -> Result<()> {
        self.record("clone_or_update", dir, &[url, branch, remote])?;
        for submodule in &self.submodules {
            fs::create_dir_all(dir.join(submodule))?;
        }
        fs::create_dir_all(dir)?;
        self.set_remote(remote, url);
        Ok(())
    }

    async fn fetch(&self, dir: &Path, remote: &str) -> Result<()> {
        self.record("fetch", dir, &[remote])
    }

    async fn submodule_status(&self, dir: &Path, path: &str) -> Result<SubmoduleState> {
        self.record("submodule_status", dir, &[path])?;
        Ok(self
            .submodule_states
            .lock()
            .unwrap()
            .get(path)
            .copied()
            .unwrap_or(SubmoduleState::Clean))
    }

    async fn submodule_init(&self, dir: &Path, path: &str) -> Result<()> {
        self.record("submodule_init", dir, &[path])
    }

    async fn reset_hard(&self, dir: &Path) -> Result<()> {
        self.record("reset_hard", dir, &[])
    }

    async fn fetch_pull_request(
        &self,
        dir: &Path,
        remote: &str,
        refspec: &str,
        number: u64,
        commit: &str,
    ) -> Result<String> {
        self.record("fetch_pull_request", dir, &[remote, refspec, commit])?;
        Ok(pull_request_branch(number))
    }

    async fn switch(&self, dir: &Path, branch: &str) -> Result<()> {
        self.record("switch", dir, &[branch])
    }

    async fn checkout(&self, dir: &Path, branch: &str) -> Result<()> {
        self.record("checkout", dir, &[branch])
    }

    async fn checkout_tracking(&self, dir: &Path, remote: &str, branch: &str) -> Result<()> {
        self.record("checkout_tracking", dir, &[remote, branch])?;
        self.add_local_branch(branch);
        Ok(())
    }

    async fn create_branch(&self, dir: &Path, branch: &str) -> Result<()> {
        self.record("create_branch", dir, &[branch])?;
        self.add_local_branch(branch);
        Ok(())
    }

    async fn force_branch(&self, dir: &Path, branch: &str, start: &str) -> Result<()> {
        self.record("force_branch", dir, &[branch, start])
    }

    async fn add(&self, dir: &Path, paths: &[PathBuf]) -> Result<()> {
        let paths: Vec<String> = paths
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        let args: Vec<&str> = paths.iter().map(String::as_str).collect();
        self.record("add", dir, &args)
    }

    async fn has_staged_changes(&self, dir: &Path) -> Result<bool> {
        self.record("has_staged_changes", dir, &[])?;
        Ok(*self.staged_changes.lock().unwrap())
    }

    async fn commit(&self, dir: &Path, message: &str) -> Result<()> {
        self.record("commit", dir, &[message])
    }

    async fn push(&self, dir: &Path, remote: &str, branch: &str, force: bool) -> Result<()> {
        let force = if force { "force" } else { "no-force" };
        self.record("push", dir, &[remote, branch, force])
    }

    async fn add_remote(&self, dir: &Path, name: &str, url: &str) -> Result<()> {
        self.record("add_remote", dir, &[name, url])?;
        self.set_remote(name, url);
        Ok(())
    }

    async fn remote_url(&self, dir: &Path, name: &str) -> Result<Option<String>> {
        self.record("remote_url", dir, &[name])?;
        Ok(self.remotes.lock().unwrap().get(name).cloned())
    }

    async fn branch_exists(&self, dir: &Path, branch: &str) -> Result<bool> {
        self.record("branch_exists", dir, &[branch])?;
        Ok(self.local_branches.lock().unwrap().contains(branch))
    }

    async fn remote_branch_exists(&self, dir: &Path, remote: &str, branch: &str) -> Result<bool> {
        self.record("remote_branch_exists", dir, &[remote, branch])?;
        Ok(self
            .remote_branches
            .lock()
            .unwrap()
            .contains(&(remote.to_string(), branch.to_string())))
    }

    async fn delete_branch(&self, dir: &Path, branch: &str) -> Result<()> {
        self.record("delete_branch", dir, &[branch])?;
        self.local_branches.lock().unwrap().remove(branch);
        Ok(())
    }

    async fn delete_remote_tracking(&self, dir: &Path, remote: &str, branch: &str) -> Result<()> {
        self.record("delete_remote_tracking", dir, &[remote, branch])
    }
}
