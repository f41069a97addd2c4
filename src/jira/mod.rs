// Jira Cloud REST v3 client: stories, comments and transitions

pub mod adf;

use crate::config::JiraConfig;
use crate::http::{self, ApiError};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;

const SERVICE: &str = "Jira";
const FEATURE_FALLBACK_DESCRIPTION: &str = "Created from GitHub";

/// Reference to a created issue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedIssue {
    pub id: String,
    pub key: String,
    #[serde(rename = "self")]
    pub self_url: String,
}

pub struct JiraClient {
    client: reqwest::Client,
    base_url: String,
    auth_header: String,
    project_key: String,
}

impl JiraClient {
    pub fn new(config: &JiraConfig, timeout_secs: u64) -> Result<Self, ApiError> {
        Ok(Self {
            client: http::build_client(timeout_secs)?,
            base_url: config.url.clone(),
            auth_header: http::basic_auth_header(&config.email, &config.api_token),
            project_key: config.project_key.clone(),
        })
    }

    /// Browser URL of an issue
    pub fn browse_url(&self, key: &str) -> String {
        format!("{}/browse/{}", self.base_url, key)
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/rest/api/3/{}", self.base_url, path)
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
    }

    /// Create the feature story tracking a GitHub issue
    pub async fn create_feature(
        &self,
        title: &str,
        description: &str,
        github_issue_number: u32,
    ) -> Result<CreatedIssue, ApiError> {
        let payload = feature_payload(&self.project_key, title, description, github_issue_number);
        let created = self.create_issue(&payload).await?;
        log::info!("Created Jira feature: {}", created.key);
        Ok(created)
    }

    /// Create a user story and link it to its parent (best effort)
    pub async fn create_user_story(
        &self,
        title: &str,
        description: &str,
        parent_key: &str,
    ) -> Result<CreatedIssue, ApiError> {
        let payload = user_story_payload(&self.project_key, title, description, parent_key);
        let created = self.create_issue(&payload).await?;
        log::info!("Created user story: {}", created.key);

        if let Err(e) = self.link_issues(&created.key, parent_key).await {
            log::warn!("Failed to link {} to {}: {}", created.key, parent_key, e);
        }

        Ok(created)
    }

    async fn create_issue(&self, payload: &serde_json::Value) -> Result<CreatedIssue, ApiError> {
        let response = self
            .request(reqwest::Method::POST, &self.api_url("issue"))
            .json(payload)
            .send()
            .await
            .map_err(ApiError::transport(SERVICE))?;

        let response = http::expect_status(SERVICE, response, StatusCode::CREATED).await?;
        response
            .json::<CreatedIssue>()
            .await
            .map_err(|e| ApiError::malformed(SERVICE, format!("Failed to parse created issue: {}", e)))
    }

    async fn link_issues(&self, inward_key: &str, outward_key: &str) -> Result<(), ApiError> {
        let payload = json!({
            "type": {"name": "Relates"},
            "inwardIssue": {"key": inward_key},
            "outwardIssue": {"key": outward_key},
        });

        let response = self
            .request(reqwest::Method::POST, &self.api_url("issueLink"))
            .json(&payload)
            .send()
            .await
            .map_err(ApiError::transport(SERVICE))?;

        http::expect_success(SERVICE, response).await?;
        Ok(())
    }

    /// Add a plain-text comment to an issue
    pub async fn add_comment(&self, issue_key: &str, comment: &str) -> Result<(), ApiError> {
        let response = self
            .request(
                reqwest::Method::POST,
                &self.api_url(&format!("issue/{}/comment", issue_key)),
            )
            .json(&json!({ "body": adf::document(comment) }))
            .send()
            .await
            .map_err(ApiError::transport(SERVICE))?;

        http::expect_status(SERVICE, response, StatusCode::CREATED).await?;
        log::info!("Added comment to {}", issue_key);
        Ok(())
    }

    /// Move an issue to the transition whose name matches `status`
    ///
    /// Returns `false` when no transition of that name is available.
    pub async fn transition_issue(&self, issue_key: &str, status: &str) -> Result<bool, ApiError> {
        let url = self.api_url(&format!("issue/{}/transitions", issue_key));

        let response = self
            .request(reqwest::Method::GET, &url)
            .send()
            .await
            .map_err(ApiError::transport(SERVICE))?;
        let response = http::expect_success(SERVICE, response).await?;
        let data = http::read_json(SERVICE, response).await?;

        let Some(transition_id) = find_transition(&data, status) else {
            log::debug!("No '{}' transition available for {}", status, issue_key);
            return Ok(false);
        };

        let response = self
            .request(reqwest::Method::POST, &url)
            .json(&json!({ "transition": { "id": transition_id } }))
            .send()
            .await
            .map_err(ApiError::transport(SERVICE))?;
        http::expect_success(SERVICE, response).await?;

        log::info!("Transitioned {} to '{}'", issue_key, status);
        Ok(true)
    }

    /// Fetch an issue; `None` when it does not exist
    pub async fn get_issue(&self, issue_key: &str) -> Result<Option<serde_json::Value>, ApiError> {
        let response = self
            .request(
                reqwest::Method::GET,
                &self.api_url(&format!("issue/{}", issue_key)),
            )
            .send()
            .await
            .map_err(ApiError::transport(SERVICE))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = http::expect_success(SERVICE, response).await?;
        Ok(Some(http::read_json(SERVICE, response).await?))
    }
}

fn feature_payload(
    project_key: &str,
    title: &str,
    description: &str,
    github_issue_number: u32,
) -> serde_json::Value {
    let description = if description.trim().is_empty() {
        FEATURE_FALLBACK_DESCRIPTION
    } else {
        description
    };

    json!({
        "fields": {
            "project": {"key": project_key},
            "summary": format!("[Feature] {}", title),
            "description": adf::paragraphs(&[
                description.to_string(),
                format!("GitHub Issue: #{}", github_issue_number),
            ]),
            "issuetype": {"name": "Story"},
            "labels": ["feature", format!("github-{}", github_issue_number)],
        }
    })
}

fn user_story_payload(
    project_key: &str,
    title: &str,
    description: &str,
    parent_key: &str,
) -> serde_json::Value {
    json!({
        "fields": {
            "project": {"key": project_key},
            "summary": title,
            "description": adf::document(description),
            "issuetype": {"name": "Story"},
            "labels": [format!("parent-{}", parent_key)],
        }
    })
}

/// Case-insensitive lookup of a transition id by name
fn find_transition(data: &serde_json::Value, status: &str) -> Option<String> {
    data["transitions"]
        .as_array()?
        .iter()
        .find(|t| {
            t["name"]
                .as_str()
                .map(|name| name.eq_ignore_ascii_case(status))
                .unwrap_or(false)
        })
        .and_then(|t| t["id"].as_str().map(|id| id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_payload() {
        let payload = feature_payload("SHOP", "Price filter", "Filter by price", 17);
        let fields = &payload["fields"];

        assert_eq!(fields["project"]["key"], "SHOP");
        assert_eq!(fields["summary"], "[Feature] Price filter");
        assert_eq!(fields["issuetype"]["name"], "Story");
        assert_eq!(fields["labels"], json!(["feature", "github-17"]));
        assert_eq!(
            fields["description"]["content"][1]["content"][0]["text"],
            "GitHub Issue: #17"
        );
    }

    #[test]
    fn test_feature_payload_without_description() {
        let payload = feature_payload("SHOP", "Price filter", "", 17);
        assert_eq!(
            payload["fields"]["description"]["content"][0]["content"][0]["text"],
            FEATURE_FALLBACK_DESCRIPTION
        );
    }

    #[test]
    fn test_user_story_payload() {
        let payload = user_story_payload("SHOP", "Filter UI", "As a shopper...", "SHOP-1");
        assert_eq!(payload["fields"]["summary"], "Filter UI");
        assert_eq!(payload["fields"]["labels"], json!(["parent-SHOP-1"]));
    }

    #[test]
    fn test_find_transition_ignores_case() {
        let data = json!({
            "transitions": [
                {"id": "11", "name": "To Do"},
                {"id": "31", "name": "Done"}
            ]
        });
        assert_eq!(find_transition(&data, "done"), Some("31".to_string()));
        assert_eq!(find_transition(&data, "In Review"), None);
        assert_eq!(find_transition(&json!({}), "done"), None);
    }

    #[test]
    fn test_created_issue_deserialization() {
        let created: CreatedIssue = serde_json::from_value(json!({
            "id": "10001",
            "key": "SHOP-5",
            "self": "https://x.atlassian.net/rest/api/3/issue/10001"
        }))
        .unwrap();
        assert_eq!(created.key, "SHOP-5");
    }

    #[test]
    fn test_browse_url() {
        let config = JiraConfig {
            url: "https://x.atlassian.net".to_string(),
            email: "bot@x.io".to_string(),
            api_token: "tok".to_string(),
            project_key: "SHOP".to_string(),
        };
        let client = JiraClient::new(&config, 30).unwrap();
        assert_eq!(client.browse_url("SHOP-5"), "https://x.atlassian.net/browse/SHOP-5");
    }
}
