//! Gitea platform service implementation

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{
    CreatePullRequest, Platform, PlatformConfig, PrState, PullRequest, Repository,
};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Gitea service using reqwest
pub struct GiteaService {
    client: Client,
    base_url: String,
    config: PlatformConfig,
}

#[derive(Deserialize)]
struct GiteaLabel {
    id: u64,
    name: String,
}

#[derive(Deserialize)]
struct GiteaBranch {
    #[serde(rename = "ref")]
    ref_field: String,
    #[serde(default)]
    sha: String,
}

#[derive(Deserialize)]
struct GiteaPullRequest {
    number: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    html_url: String,
    state: String,
    #[serde(default)]
    merged: bool,
    #[serde(default)]
    labels: Vec<GiteaLabel>,
    head: GiteaBranch,
    base: GiteaBranch,
}

#[derive(Deserialize)]
struct GiteaUser {
    login: String,
}

#[derive(Deserialize)]
struct GiteaRepository {
    name: String,
    owner: GiteaUser,
    #[serde(default)]
    clone_url: String,
    #[serde(default)]
    ssh_url: String,
}

#[derive(Serialize)]
struct CreatePullPayload<'a> {
    head: String,
    base: &'a str,
    title: &'a str,
    body: &'a str,
}

#[derive(Serialize)]
struct EditPullPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<&'a str>,
}

#[derive(Serialize)]
struct CreateLabelPayload<'a> {
    name: &'a str,
    color: &'a str,
}

#[derive(Serialize)]
struct IssueLabelsPayload {
    labels: Vec<u64>,
}

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Color given to labels this tool has to create
const DEFAULT_LABEL_COLOR: &str = "#a47dab";

/// Page size for list endpoints
const PAGE_SIZE: usize = 50;

impl GiteaService {
    /// Create a new Gitea service
    ///
    /// `base_url` is the instance root, e.g. `https://src.example.org`.
    pub fn new(token: &str, base_url: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(&format!("token {token}"))
            .map_err(|e| Error::Auth(format!("invalid Gitea token: {e}")))?;
        headers.insert(AUTHORIZATION, value);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::GiteaApi(format!("failed to create HTTP client: {e}")))?;

        let base_url = base_url.trim_end_matches('/').to_string();
        let host = url::Url::parse(&base_url)
            .ok()
            .and_then(|u| u.host_str().map(ToString::to_string));

        Ok(Self {
            client,
            base_url,
            config: PlatformConfig {
                platform: Platform::Gitea,
                host,
            },
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    fn repo_url(owner: &str, repo: &str) -> String {
        format!(
            "/repos/{}/{}",
            urlencoding::encode(owner),
            urlencoding::encode(repo)
        )
    }

    /// Send a request, mapping 404 to [`Error::NotFound`] with `resource`
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, resource: &str) -> Result<T> {
        let response = request.send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(resource.to_string()));
        }

        let response = response
            .error_for_status()
            .map_err(|e| Error::GiteaApi(format!("{resource}: {e}")))?;

        Ok(response.json().await?)
    }

    async fn list_labels(&self, owner: &str, repo: &str) -> Result<Vec<GiteaLabel>> {
        let url = self.api_url(&format!("{}/labels", Self::repo_url(owner, repo)));
        let mut labels = Vec::new();
        let mut page = 1usize;

        loop {
            let batch: Vec<GiteaLabel> = self
                .send(
                    self.client.get(&url).query(&[
                        ("page", page.to_string()),
                        ("limit", PAGE_SIZE.to_string()),
                    ]),
                    &format!("{owner}/{repo} labels"),
                )
                .await?;

            let done = batch.len() < PAGE_SIZE;
            labels.extend(batch);
            if done {
                return Ok(labels);
            }
            page += 1;
        }
    }

    async fn create_label(&self, owner: &str, repo: &str, name: &str) -> Result<GiteaLabel> {
        debug!(owner, repo, name, "creating label");
        let url = self.api_url(&format!("{}/labels", Self::repo_url(owner, repo)));
        self.send(
            self.client.post(&url).json(&CreateLabelPayload {
                name,
                color: DEFAULT_LABEL_COLOR,
            }),
            &format!("{owner}/{repo} labels"),
        )
        .await
    }

    fn convert_pr(owner: &str, repo: &str, pr: GiteaPullRequest) -> PullRequest {
        let state = if pr.merged {
            PrState::Merged
        } else if pr.state == "closed" {
            PrState::Closed
        } else {
            PrState::Open
        };

        PullRequest {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number: pr.number,
            title: pr.title,
            body: pr.body.unwrap_or_default(),
            labels: pr.labels.into_iter().map(|l| l.name).collect(),
            base_ref: pr.base.ref_field,
            head_ref: pr.head.ref_field,
            head_sha: pr.head.sha,
            html_url: pr.html_url,
            state,
        }
    }
}

#[async_trait]
impl PlatformService for GiteaService {
    async fn get_pr(&self, owner: &str, repo: &str, number: u64) -> Result<PullRequest> {
        debug!(owner, repo, number, "fetching PR");
        let url = self.api_url(&format!("{}/pulls/{number}", Self::repo_url(owner, repo)));

        let pr: GiteaPullRequest = self
            .send(self.client.get(&url), &format!("{owner}/{repo}#{number}"))
            .await?;

        Ok(Self::convert_pr(owner, repo, pr))
    }

    async fn create_pr(&self, request: &CreatePullRequest) -> Result<PullRequest> {
        debug!(
            target_owner = %request.target_owner,
            target_repo = %request.target_repo,
            source_branch = %request.source_branch,
            "creating PR"
        );
        let url = self.api_url(&format!(
            "{}/pulls",
            Self::repo_url(&request.target_owner, &request.target_repo)
        ));

        let payload = CreatePullPayload {
            head: format!("{}:{}", request.source_owner, request.source_branch),
            base: &request.target_branch,
            title: &request.title,
            body: &request.body,
        };

        let pr: GiteaPullRequest = self
            .send(
                self.client.post(&url).json(&payload),
                &format!("{}/{}", request.target_owner, request.target_repo),
            )
            .await?;

        Ok(Self::convert_pr(
            &request.target_owner,
            &request.target_repo,
            pr,
        ))
    }

    async fn update_pr_body(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<PullRequest> {
        debug!(owner, repo, number, "updating PR description");
        let url = self.api_url(&format!("{}/pulls/{number}", Self::repo_url(owner, repo)));

        let pr: GiteaPullRequest = self
            .send(
                self.client.patch(&url).json(&EditPullPayload {
                    body: Some(body),
                    state: None,
                }),
                &format!("{owner}/{repo}#{number}"),
            )
            .await?;

        Ok(Self::convert_pr(owner, repo, pr))
    }

    async fn add_labels(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        labels: &[&str],
    ) -> Result<()> {
        debug!(owner, repo, number, ?labels, "adding labels");
        let existing = self.list_labels(owner, repo).await?;

        let mut ids = Vec::with_capacity(labels.len());
        for name in labels {
            if let Some(label) = existing.iter().find(|l| l.name == *name) {
                ids.push(label.id);
            } else {
                ids.push(self.create_label(owner, repo, name).await?.id);
            }
        }

        let url = self.api_url(&format!(
            "{}/issues/{number}/labels",
            Self::repo_url(owner, repo)
        ));
        let _: IgnoredAny = self
            .send(
                self.client.post(&url).json(&IssueLabelsPayload { labels: ids }),
                &format!("{owner}/{repo}#{number}"),
            )
            .await?;

        Ok(())
    }

    async fn close_pr(&self, owner: &str, repo: &str, number: u64) -> Result<()> {
        debug!(owner, repo, number, "closing PR");
        let url = self.api_url(&format!("{}/pulls/{number}", Self::repo_url(owner, repo)));

        let _: IgnoredAny = self
            .send(
                self.client.patch(&url).json(&EditPullPayload {
                    body: None,
                    state: Some("closed"),
                }),
                &format!("{owner}/{repo}#{number}"),
            )
            .await?;

        Ok(())
    }

    async fn get_repo(&self, owner: &str, repo: &str) -> Result<Repository> {
        debug!(owner, repo, "fetching repository");
        let url = self.api_url(&Self::repo_url(owner, repo));

        let r: GiteaRepository = self
            .send(self.client.get(&url), &format!("{owner}/{repo}"))
            .await?;

        Ok(Repository {
            owner: r.owner.login,
            name: r.name,
            clone_url: r.clone_url,
            ssh_url: r.ssh_url,
        })
    }

    async fn current_user(&self) -> Result<String> {
        let user: GiteaUser = self
            .send(self.client.get(self.api_url("/user")), "current user")
            .await?;
        Ok(user.login)
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
