//! Mock platform service for testing

#![allow(dead_code)]

use async_trait::async_trait;
use git_staging::error::{Error, Result};
use git_staging::platform::PlatformService;
use git_staging::types::{
    CreatePullRequest, Platform, PlatformConfig, PrRef, PrState, PullRequest, Repository,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Call record for `update_pr_body`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateBodyCall {
    pub reference: PrRef,
    pub body: String,
}

/// Call record for `add_labels`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddLabelsCall {
    pub reference: PrRef,
    pub labels: Vec<String>,
}

/// Simple mock platform service for testing
///
/// Pull requests and repositories are registered up front; anything not
/// registered answers with [`Error::NotFound`] the way a forge 404 does.
///
/// Features:
/// - Auto-incrementing numbers for created PRs
/// - Call tracking for verification
/// - Error injection for failure path testing
pub struct MockPlatformService {
    config: PlatformConfig,
    next_pr_number: AtomicU64,
    prs: Mutex<HashMap<PrRef, PullRequest>>,
    repos: Mutex<HashMap<String, Repository>>,
    // Call tracking
    get_pr_calls: Mutex<Vec<PrRef>>,
    create_pr_calls: Mutex<Vec<CreatePullRequest>>,
    update_body_calls: Mutex<Vec<UpdateBodyCall>>,
    add_labels_calls: Mutex<Vec<AddLabelsCall>>,
    close_calls: Mutex<Vec<PrRef>>,
    get_repo_calls: Mutex<Vec<String>>,
    // Error injection
    error_on_get_pr: Mutex<HashMap<PrRef, String>>,
    not_found_on_close: Mutex<HashSet<PrRef>>,
    error_on_create_pr: Mutex<Option<String>>,
}

impl MockPlatformService {
    /// Gitea mock for `src.example.org`
    pub fn new() -> Self {
        Self::with_config(PlatformConfig {
            platform: Platform::Gitea,
            host: Some("src.example.org".to_string()),
        })
    }

    /// Create a new mock with the given config
    pub fn with_config(config: PlatformConfig) -> Self {
        Self {
            config,
            next_pr_number: AtomicU64::new(100),
            prs: Mutex::new(HashMap::new()),
            repos: Mutex::new(HashMap::new()),
            get_pr_calls: Mutex::new(Vec::new()),
            create_pr_calls: Mutex::new(Vec::new()),
            update_body_calls: Mutex::new(Vec::new()),
            add_labels_calls: Mutex::new(Vec::new()),
            close_calls: Mutex::new(Vec::new()),
            get_repo_calls: Mutex::new(Vec::new()),
            error_on_get_pr: Mutex::new(HashMap::new()),
            not_found_on_close: Mutex::new(HashSet::new()),
            error_on_create_pr: Mutex::new(None),
        }
    }

    // === Setup ===

    /// Register a pull request
    pub fn add_pr(&self, pr: PullRequest) {
        self.prs.lock().unwrap().insert(pr.reference(), pr);
    }

    /// Register a repository
    pub fn add_repo(&self, repo: Repository) {
        self.repos
            .lock()
            .unwrap()
            .insert(format!("{}/{}", repo.owner, repo.name), repo);
    }

    /// Current state of a registered pull request
    pub fn pr(&self, reference: &PrRef) -> Option<PullRequest> {
        self.prs.lock().unwrap().get(reference).cloned()
    }

    // === Error injection methods ===

    /// Make `get_pr` fail with a non-404 error for one reference
    pub fn fail_get_pr(&self, reference: &PrRef, msg: &str) {
        self.error_on_get_pr
            .lock()
            .unwrap()
            .insert(reference.clone(), msg.to_string());
    }

    /// Make `close_pr` answer 404 for one reference
    pub fn not_found_on_close(&self, reference: &PrRef) {
        self.not_found_on_close
            .lock()
            .unwrap()
            .insert(reference.clone());
    }

    /// Make `create_pr` return an error
    pub fn fail_create_pr(&self, msg: &str) {
        *self.error_on_create_pr.lock().unwrap() = Some(msg.to_string());
    }

    // === Call verification methods ===

    pub fn get_pr_calls(&self) -> Vec<PrRef> {
        self.get_pr_calls.lock().unwrap().clone()
    }

    pub fn create_pr_calls(&self) -> Vec<CreatePullRequest> {
        self.create_pr_calls.lock().unwrap().clone()
    }

    pub fn update_body_calls(&self) -> Vec<UpdateBodyCall> {
        self.update_body_calls.lock().unwrap().clone()
    }

    pub fn add_labels_calls(&self) -> Vec<AddLabelsCall> {
        self.add_labels_calls.lock().unwrap().clone()
    }

    pub fn close_calls(&self) -> Vec<PrRef> {
        self.close_calls.lock().unwrap().clone()
    }

    pub fn get_repo_calls(&self) -> Vec<String> {
        self.get_repo_calls.lock().unwrap().clone()
    }

    /// Assert that no call modified anything on the forge
    pub fn assert_no_writes(&self) {
        assert!(self.create_pr_calls().is_empty(), "unexpected create_pr");
        assert!(self.update_body_calls().is_empty(), "unexpected update_pr_body");
        assert!(self.add_labels_calls().is_empty(), "unexpected add_labels");
        assert!(self.close_calls().is_empty(), "unexpected close_pr");
    }
}

impl Default for MockPlatformService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn get_pr(&self, owner: &str, repo: &str, number: u64) -> Result<PullRequest> {
        let reference = PrRef::new(owner, repo, number);
        self.get_pr_calls.lock().unwrap().push(reference.clone());

        if let Some(msg) = self.error_on_get_pr.lock().unwrap().get(&reference) {
            return Err(Error::Platform(msg.clone()));
        }

        self.prs
            .lock()
            .unwrap()
            .get(&reference)
            .cloned()
            .ok_or_else(|| Error::NotFound(reference.to_string()))
    }

    async fn create_pr(&self, request: &CreatePullRequest) -> Result<PullRequest> {
        self.create_pr_calls.lock().unwrap().push(request.clone());

        if let Some(msg) = self.error_on_create_pr.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }

        let number = self.next_pr_number.fetch_add(1, Ordering::SeqCst);
        let pr = PullRequest {
            owner: request.target_owner.clone(),
            repo: request.target_repo.clone(),
            number,
            title: request.title.clone(),
            body: request.body.clone(),
            labels: Vec::new(),
            base_ref: request.target_branch.clone(),
            head_ref: request.source_branch.clone(),
            head_sha: format!("{}_sha", request.source_branch),
            html_url: format!(
                "https://src.example.org/{}/{}/pulls/{number}",
                request.target_owner, request.target_repo
            ),
            state: PrState::Open,
        };
        self.add_pr(pr.clone());
        Ok(pr)
    }

    async fn update_pr_body(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<PullRequest> {
        let reference = PrRef::new(owner, repo, number);
        self.update_body_calls.lock().unwrap().push(UpdateBodyCall {
            reference: reference.clone(),
            body: body.to_string(),
        });

        let mut prs = self.prs.lock().unwrap();
        let pr = prs
            .get_mut(&reference)
            .ok_or_else(|| Error::NotFound(reference.to_string()))?;
        pr.body = body.to_string();
        Ok(pr.clone())
    }

    async fn add_labels(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        labels: &[&str],
    ) -> Result<()> {
        let reference = PrRef::new(owner, repo, number);
        self.add_labels_calls.lock().unwrap().push(AddLabelsCall {
            reference: reference.clone(),
            labels: labels.iter().map(ToString::to_string).collect(),
        });

        if let Some(pr) = self.prs.lock().unwrap().get_mut(&reference) {
            pr.labels.extend(labels.iter().map(ToString::to_string));
        }
        Ok(())
    }

    async fn close_pr(&self, owner: &str, repo: &str, number: u64) -> Result<()> {
        let reference = PrRef::new(owner, repo, number);
        self.close_calls.lock().unwrap().push(reference.clone());

        if self.not_found_on_close.lock().unwrap().contains(&reference) {
            return Err(Error::NotFound(reference.to_string()));
        }

        let mut prs = self.prs.lock().unwrap();
        let pr = prs
            .get_mut(&reference)
            .ok_or_else(|| Error::NotFound(reference.to_string()))?;
        pr.state = PrState::Closed;
        Ok(())
    }

    async fn get_repo(&self, owner: &str, repo: &str) -> Result<Repository> {
        let key = format!("{owner}/{repo}");
        self.get_repo_calls.lock().unwrap().push(key.clone());

        self.repos
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or(Error::NotFound(key))
    }

    async fn current_user(&self) -> Result<String> {
        Ok("mock-user".to_string())
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
