//! GitLab platform service implementation

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{
    CreatePullRequest, Platform, PlatformConfig, PrState, PullRequest, Repository,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// GitLab service using reqwest
pub struct GitLabService {
    client: Client,
    token: String,
    base_url: String,
    config: PlatformConfig,
}

#[derive(Deserialize)]
struct MergeRequest {
    iid: u64,
    title: String,
    description: Option<String>,
    state: String, // "opened", "closed", "merged", "locked"
    web_url: String,
    source_branch: String,
    target_branch: String,
    #[serde(default)]
    sha: String,
    #[serde(default)]
    labels: Vec<String>,
}

#[derive(Deserialize)]
struct User {
    username: String,
}

#[derive(Deserialize)]
struct Namespace {
    full_path: String,
}

#[derive(Deserialize)]
struct Project {
    id: u64,
    path: String,
    namespace: Namespace,
    #[serde(default)]
    ssh_url_to_repo: String,
    #[serde(default)]
    http_url_to_repo: String,
}

#[derive(Serialize)]
struct CreateMrPayload<'a> {
    source_branch: &'a str,
    target_branch: &'a str,
    title: &'a str,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_project_id: Option<u64>,
}

#[derive(Serialize, Default)]
struct UpdateMrPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    add_labels: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    state_event: Option<&'a str>,
}

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

impl GitLabService {
    /// Create a new GitLab service
    ///
    /// `base_url` defaults to `https://gitlab.com` when `None`.
    pub fn new(token: String, base_url: Option<&str>) -> Result<Self> {
        let base_url = base_url
            .unwrap_or("https://gitlab.com")
            .trim_end_matches('/')
            .to_string();

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::GitLabApi(format!("failed to create HTTP client: {e}")))?;

        let host = url::Url::parse(&base_url)
            .ok()
            .and_then(|u| u.host_str().map(ToString::to_string))
            .filter(|h| h != "gitlab.com");

        Ok(Self {
            client,
            token,
            base_url,
            config: PlatformConfig {
                platform: Platform::GitLab,
                host,
            },
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/v4{}", self.base_url, path)
    }

    fn encoded_project(owner: &str, repo: &str) -> String {
        urlencoding::encode(&format!("{owner}/{repo}")).into_owned()
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, resource: &str) -> Result<T> {
        let response = request.header("PRIVATE-TOKEN", &self.token).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(resource.to_string()));
        }

        let response = response
            .error_for_status()
            .map_err(|e| Error::GitLabApi(format!("{resource}: {e}")))?;

        Ok(response.json().await?)
    }

    async fn get_project(&self, owner: &str, repo: &str) -> Result<Project> {
        let url = self.api_url(&format!("/projects/{}", Self::encoded_project(owner, repo)));
        self.send(self.client.get(&url), &format!("{owner}/{repo}"))
            .await
    }

    async fn update_mr(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        payload: &UpdateMrPayload<'_>,
    ) -> Result<MergeRequest> {
        let url = self.api_url(&format!(
            "/projects/{}/merge_requests/{number}",
            Self::encoded_project(owner, repo)
        ));
        self.send(
            self.client.put(&url).json(payload),
            &format!("{owner}/{repo}!{number}"),
        )
        .await
    }

    fn convert_mr(owner: &str, repo: &str, mr: MergeRequest) -> PullRequest {
        let state = match mr.state.as_str() {
            "merged" => PrState::Merged,
            "closed" => PrState::Closed,
            _ => PrState::Open,
        };

        PullRequest {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number: mr.iid,
            title: mr.title,
            body: mr.description.unwrap_or_default(),
            labels: mr.labels,
            base_ref: mr.target_branch,
            head_ref: mr.source_branch,
            head_sha: mr.sha,
            html_url: mr.web_url,
            state,
        }
    }
}

#[async_trait]
impl PlatformService for GitLabService {
    async fn get_pr(&self, owner: &str, repo: &str, number: u64) -> Result<PullRequest> {
        debug!(owner, repo, number, "fetching MR");
        let url = self.api_url(&format!(
            "/projects/{}/merge_requests/{number}",
            Self::encoded_project(owner, repo)
        ));

        let mr: MergeRequest = self
            .send(self.client.get(&url), &format!("{owner}/{repo}!{number}"))
            .await?;

        Ok(Self::convert_mr(owner, repo, mr))
    }

    async fn create_pr(&self, request: &CreatePullRequest) -> Result<PullRequest> {
        debug!(
            target_owner = %request.target_owner,
            target_repo = %request.target_repo,
            source_branch = %request.source_branch,
            "creating MR"
        );

        // Merge requests from a fork are opened on the fork project
        let cross_project = request.source_owner != request.target_owner
            || request.source_repo != request.target_repo;
        let target_project_id = if cross_project {
            Some(
                self.get_project(&request.target_owner, &request.target_repo)
                    .await?
                    .id,
            )
        } else {
            None
        };

        let url = self.api_url(&format!(
            "/projects/{}/merge_requests",
            Self::encoded_project(&request.source_owner, &request.source_repo)
        ));

        let payload = CreateMrPayload {
            source_branch: &request.source_branch,
            target_branch: &request.target_branch,
            title: &request.title,
            description: &request.body,
            target_project_id,
        };

        let mr: MergeRequest = self
            .send(
                self.client.post(&url).json(&payload),
                &format!("{}/{}", request.source_owner, request.source_repo),
            )
            .await?;

        Ok(Self::convert_mr(
            &request.target_owner,
            &request.target_repo,
            mr,
        ))
    }

    async fn update_pr_body(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<PullRequest> {
        debug!(owner, repo, number, "updating MR description");
        let payload = UpdateMrPayload {
            description: Some(body),
            ..Default::default()
        };
        let mr = self.update_mr(owner, repo, number, &payload).await?;
        Ok(Self::convert_mr(owner, repo, mr))
    }

    async fn add_labels(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        labels: &[&str],
    ) -> Result<()> {
        debug!(owner, repo, number, ?labels, "adding labels");
        let payload = UpdateMrPayload {
            add_labels: Some(labels.join(",")),
            ..Default::default()
        };
        self.update_mr(owner, repo, number, &payload).await?;
        Ok(())
    }

    async fn close_pr(&self, owner: &str, repo: &str, number: u64) -> Result<()> {
        debug!(owner, repo, number, "closing MR");
        let payload = UpdateMrPayload {
            state_event: Some("close"),
            ..Default::default()
        };
        self.update_mr(owner, repo, number, &payload).await?;
        Ok(())
    }

    async fn get_repo(&self, owner: &str, repo: &str) -> Result<Repository> {
        debug!(owner, repo, "fetching project");
        let project = self.get_project(owner, repo).await?;

        Ok(Repository {
            owner: project.namespace.full_path,
            name: project.path,
            clone_url: project.http_url_to_repo,
            ssh_url: project.ssh_url_to_repo,
        })
    }

    async fn current_user(&self) -> Result<String> {
        let user: User = self
            .send(self.client.get(self.api_url("/user")), "current user")
            .await?;
        Ok(user.username)
    }

    fn pull_request_refspec(&self, number: u64) -> String {
        format!("refs/merge-requests/{number}/head")
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
