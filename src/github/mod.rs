// GitHub API integration for PRs, issues and comments

use crate::config::GitHubConfig;
use crate::http::{self, ApiError};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;

const SERVICE: &str = "GitHub";
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// GitHub Pull Request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u32,
    pub title: String,
    pub body: Option<String>,
    pub state: String,
    pub html_url: String,
    pub head_branch: String,
    pub base_branch: String,
    pub created_at: String,
    pub updated_at: String,
    pub merged: bool,
    pub merged_at: Option<String>,
}

impl PullRequest {
    fn from_json(pr_data: &serde_json::Value) -> Self {
        let merged_at = pr_data["merged_at"].as_str().map(|s| s.to_string());
        Self {
            number: pr_data["number"].as_u64().unwrap_or(0) as u32,
            title: pr_data["title"].as_str().unwrap_or("").to_string(),
            body: pr_data["body"].as_str().map(|s| s.to_string()),
            state: pr_data["state"].as_str().unwrap_or("").to_string(),
            html_url: pr_data["html_url"].as_str().unwrap_or("").to_string(),
            head_branch: pr_data["head"]["ref"].as_str().unwrap_or("").to_string(),
            base_branch: pr_data["base"]["ref"].as_str().unwrap_or("").to_string(),
            created_at: pr_data["created_at"].as_str().unwrap_or("").to_string(),
            updated_at: pr_data["updated_at"].as_str().unwrap_or("").to_string(),
            // The list endpoint omits `merged`; `merged_at` is always present
            merged: pr_data["merged"].as_bool().unwrap_or(merged_at.is_some()),
            merged_at,
        }
    }
}

/// File touched by a pull request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestFile {
    pub filename: String,
    pub status: String,
    pub additions: u64,
    pub deletions: u64,
    /// Unified diff hunk; absent for binary or very large files
    pub patch: Option<String>,
}

impl PullRequestFile {
    fn from_json(file_data: &serde_json::Value) -> Self {
        Self {
            filename: file_data["filename"].as_str().unwrap_or("").to_string(),
            status: file_data["status"].as_str().unwrap_or("").to_string(),
            additions: file_data["additions"].as_u64().unwrap_or(0),
            deletions: file_data["deletions"].as_u64().unwrap_or(0),
            patch: file_data["patch"].as_str().map(|s| s.to_string()),
        }
    }
}

/// GitHub Issue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub number: u32,
    pub title: String,
    pub body: Option<String>,
    pub state: String,
    pub html_url: String,
    pub labels: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Issue {
    fn from_json(issue_data: &serde_json::Value) -> Self {
        let labels = issue_data["labels"]
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|l| l["name"].as_str())
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            number: issue_data["number"].as_u64().unwrap_or(0) as u32,
            title: issue_data["title"].as_str().unwrap_or("").to_string(),
            body: issue_data["body"].as_str().map(|s| s.to_string()),
            state: issue_data["state"].as_str().unwrap_or("").to_string(),
            html_url: issue_data["html_url"].as_str().unwrap_or("").to_string(),
            labels,
            created_at: issue_data["created_at"].as_str().unwrap_or("").to_string(),
            updated_at: issue_data["updated_at"].as_str().unwrap_or("").to_string(),
        }
    }
}

/// A posted comment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub html_url: String,
}

/// GitHub API client
pub struct GitHubClient {
    client: reqwest::Client,
    token: String,
    owner: String,
    repo: String,
    api_base: String,
}

impl GitHubClient {
    /// Create a new GitHub client
    pub fn new(config: &GitHubConfig, timeout_secs: u64) -> Result<Self, ApiError> {
        Ok(Self {
            client: http::build_client(timeout_secs)?,
            token: config.token.clone(),
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }

    /// Point the client at a GitHub Enterprise API
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_base, self.owner, self.repo, path
        )
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
    }

    fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
    }

    async fn get_json(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<serde_json::Value, ApiError> {
        let response = self
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(ApiError::transport(SERVICE))?;
        let response = http::expect_success(SERVICE, response).await?;
        http::read_json(SERVICE, response).await
    }

    /// Get a pull request by number
    pub async fn get_pull_request(&self, number: u32) -> Result<PullRequest, ApiError> {
        let pr_data = self
            .get_json(&self.repo_url(&format!("pulls/{}", number)), &[])
            .await?;
        Ok(PullRequest::from_json(&pr_data))
    }

    /// List pull requests (`open`, `closed` or `all`)
    pub async fn list_pull_requests(&self, state: &str) -> Result<Vec<PullRequest>, ApiError> {
        let prs_data = self
            .get_json(&self.repo_url("pulls"), &[("state", state)])
            .await?;
        let prs = as_array(&prs_data)?
            .iter()
            .map(PullRequest::from_json)
            .collect();
        Ok(prs)
    }

    /// List the files changed by a pull request
    pub async fn list_pull_request_files(
        &self,
        number: u32,
    ) -> Result<Vec<PullRequestFile>, ApiError> {
        let files_data = self
            .get_json(&self.repo_url(&format!("pulls/{}/files", number)), &[])
            .await?;
        let files = as_array(&files_data)?
            .iter()
            .map(PullRequestFile::from_json)
            .collect();
        Ok(files)
    }

    /// Get an issue by number
    pub async fn get_issue(&self, number: u32) -> Result<Issue, ApiError> {
        let issue_data = self
            .get_json(&self.repo_url(&format!("issues/{}", number)), &[])
            .await?;
        Ok(Issue::from_json(&issue_data))
    }

    /// List issues, optionally only those updated since an ISO 8601 timestamp
    pub async fn list_issues(
        &self,
        state: &str,
        since: Option<&str>,
    ) -> Result<Vec<Issue>, ApiError> {
        let mut query = vec![("state", state)];
        if let Some(since) = since {
            query.push(("since", since));
        }

        let issues_data = self.get_json(&self.repo_url("issues"), &query).await?;
        issues_from_json(&issues_data)
    }

    /// Comment on an issue or pull request
    pub async fn post_issue_comment(&self, number: u32, body: &str) -> Result<Comment, ApiError> {
        self.post_comment(&self.repo_url(&format!("issues/{}/comments", number)), body)
            .await
    }

    /// Comment on a commit
    pub async fn post_commit_comment(&self, sha: &str, body: &str) -> Result<Comment, ApiError> {
        self.post_comment(&self.repo_url(&format!("commits/{}/comments", sha)), body)
            .await
    }

    async fn post_comment(&self, url: &str, body: &str) -> Result<Comment, ApiError> {
        let response = self
            .post(url)
            .json(&json!({ "body": body }))
            .send()
            .await
            .map_err(ApiError::transport(SERVICE))?;

        let response = http::expect_status(SERVICE, response, StatusCode::CREATED).await?;
        let data = http::read_json(SERVICE, response).await?;

        Ok(Comment {
            id: data["id"].as_u64().unwrap_or(0),
            html_url: data["html_url"].as_str().unwrap_or("N/A").to_string(),
        })
    }
}

/// The issues endpoint also returns pull requests; keep only real issues
fn issues_from_json(issues_data: &serde_json::Value) -> Result<Vec<Issue>, ApiError> {
    let issues = as_array(issues_data)?
        .iter()
        .filter(|issue_data| issue_data.get("pull_request").is_none())
        .map(Issue::from_json)
        .collect();
    Ok(issues)
}

fn as_array(value: &serde_json::Value) -> Result<&Vec<serde_json::Value>, ApiError> {
    value
        .as_array()
        .ok_or_else(|| ApiError::malformed(SERVICE, "expected a JSON array"))
}
