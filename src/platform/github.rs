//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{
    CreatePullRequest, Platform, PlatformConfig, PrState, PullRequest, Repository,
};
use async_trait::async_trait;
use octocrab::Octocrab;
use octocrab::models::IssueState;
use tracing::debug;

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
    config: PlatformConfig,
}

impl GitHubService {
    /// Create a new GitHub service
    pub fn new(token: &str, host: Option<String>) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());

        if let Some(ref h) = host {
            let base_url = format!("{}/api/v3", super::factory::base_url(h));
            builder = builder
                .base_uri(&base_url)
                .map_err(|e| Error::GitHubApi(e.to_string()))?;
        }

        let client = builder.build().map_err(|e| Error::GitHubApi(e.to_string()))?;

        Ok(Self {
            client,
            config: PlatformConfig {
                platform: Platform::GitHub,
                host,
            },
        })
    }
}

fn convert_pr(owner: &str, repo: &str, pr: octocrab::models::pulls::PullRequest) -> PullRequest {
    let state = if pr.merged_at.is_some() {
        PrState::Merged
    } else if matches!(pr.state, Some(IssueState::Closed)) {
        PrState::Closed
    } else {
        PrState::Open
    };

    PullRequest {
        owner: owner.to_string(),
        repo: repo.to_string(),
        number: pr.number,
        title: pr.title.unwrap_or_default(),
        body: pr.body.unwrap_or_default(),
        labels: pr
            .labels
            .unwrap_or_default()
            .into_iter()
            .map(|l| l.name)
            .collect(),
        base_ref: pr.base.ref_field,
        head_ref: pr.head.ref_field,
        head_sha: pr.head.sha,
        html_url: pr
            .html_url
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        state,
    }
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn get_pr(&self, owner: &str, repo: &str, number: u64) -> Result<PullRequest> {
        debug!(owner, repo, number, "fetching PR");
        let pr = self.client.pulls(owner, repo).get(number).await?;
        Ok(convert_pr(owner, repo, pr))
    }

    async fn create_pr(&self, request: &CreatePullRequest) -> Result<PullRequest> {
        debug!(
            target_owner = %request.target_owner,
            target_repo = %request.target_repo,
            source_branch = %request.source_branch,
            "creating PR"
        );
        let head = format!("{}:{}", request.source_owner, request.source_branch);

        let pr = self
            .client
            .pulls(&request.target_owner, &request.target_repo)
            .create(&request.title, head, &request.target_branch)
            .body(&request.body)
            .send()
            .await?;

        Ok(convert_pr(&request.target_owner, &request.target_repo, pr))
    }

    async fn update_pr_body(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<PullRequest> {
        debug!(owner, repo, number, "updating PR description");
        let pr = self
            .client
            .pulls(owner, repo)
            .update(number)
            .body(body)
            .send()
            .await?;

        Ok(convert_pr(owner, repo, pr))
    }

    async fn add_labels(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        labels: &[&str],
    ) -> Result<()> {
        debug!(owner, repo, number, ?labels, "adding labels");
        let labels: Vec<String> = labels.iter().map(ToString::to_string).collect();
        self.client
            .issues(owner, repo)
            .add_labels(number, &labels)
            .await?;
        Ok(())
    }

    async fn close_pr(&self, owner: &str, repo: &str, number: u64) -> Result<()> {
        debug!(owner, repo, number, "closing PR");
        self.client
            .pulls(owner, repo)
            .update(number)
            .state(octocrab::params::pulls::State::Closed)
            .send()
            .await?;
        Ok(())
    }

    async fn get_repo(&self, owner: &str, repo: &str) -> Result<Repository> {
        debug!(owner, repo, "fetching repository");
        let r = self.client.repos(owner, repo).get().await?;

        Ok(Repository {
            owner: r
                .owner
                .map_or_else(|| owner.to_string(), |o| o.login),
            name: r.name,
            clone_url: r.clone_url.map(|u| u.to_string()).unwrap_or_default(),
            ssh_url: r.ssh_url.unwrap_or_default(),
        })
    }

    async fn current_user(&self) -> Result<String> {
        let user = self.client.current().user().await?;
        Ok(user.login)
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
