// Confluence Cloud REST client for publishing agent reports

pub mod markup;

use crate::config::ConfluenceConfig;
use crate::http::{self, ApiError};
use serde::{Deserialize, Serialize};
use serde_json::json;

const SERVICE: &str = "Confluence";

/// A page as returned by the content API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub title: String,
    pub version: u64,
    /// Storage-format body, when the request expanded it
    pub body: Option<String>,
    /// Browser URL of the page
    pub url: String,
}

pub struct ConfluenceClient {
    client: reqwest::Client,
    base_url: String,
    auth_header: String,
    space_key: String,
}

impl ConfluenceClient {
    pub fn new(config: &ConfluenceConfig, timeout_secs: u64) -> Result<Self, ApiError> {
        Ok(Self {
            client: http::build_client(timeout_secs)?,
            base_url: config.url.clone(),
            auth_header: http::basic_auth_header(&config.email, &config.api_token),
            space_key: config.space_key.clone(),
        })
    }

    /// Browser URL for a page id
    pub fn page_url(&self, page_id: &str) -> String {
        format!("{}/pages/viewpage.action?pageId={}", self.base_url, page_id)
    }

    fn content_url(&self, suffix: &str) -> String {
        if suffix.is_empty() {
            format!("{}/rest/api/content", self.base_url)
        } else {
            format!("{}/rest/api/content/{}", self.base_url, suffix)
        }
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
    }

    /// Publish a markdown document as a new page in the configured space
    pub async fn create_page(
        &self,
        title: &str,
        markdown: &str,
        parent_id: Option<&str>,
    ) -> Result<Page, ApiError> {
        let payload = create_payload(&self.space_key, title, &markup::convert(markdown), parent_id);

        let response = self
            .request(reqwest::Method::POST, &self.content_url(""))
            .json(&payload)
            .send()
            .await
            .map_err(ApiError::transport(SERVICE))?;

        let response = http::expect_success(SERVICE, response).await?;
        let data = http::read_json(SERVICE, response).await?;
        let page = self.page_from_json(&data)?;

        log::info!("Created Confluence page: {}", title);
        log::info!("   URL: {}", page.url);
        Ok(page)
    }

    /// Replace a page body with already-converted storage markup
    ///
    /// `version` is the page's current version; the submission carries the next one.
    pub async fn update_page(
        &self,
        page_id: &str,
        title: &str,
        storage_html: &str,
        version: u64,
    ) -> Result<Page, ApiError> {
        let payload = update_payload(title, storage_html, version);

        let response = self
            .request(reqwest::Method::PUT, &self.content_url(page_id))
            .json(&payload)
            .send()
            .await
            .map_err(ApiError::transport(SERVICE))?;

        let response = http::expect_success(SERVICE, response).await?;
        let data = http::read_json(SERVICE, response).await?;
        let page = self.page_from_json(&data)?;

        log::info!("Updated Confluence page: {}", title);
        Ok(page)
    }

    /// Look up a page in the configured space by exact title
    pub async fn get_page_by_title(&self, title: &str) -> Result<Option<Page>, ApiError> {
        let response = self
            .request(reqwest::Method::GET, &self.content_url(""))
            .query(&[
                ("spaceKey", self.space_key.as_str()),
                ("title", title),
                ("expand", "version,body.storage"),
            ])
            .send()
            .await
            .map_err(ApiError::transport(SERVICE))?;

        if !response.status().is_success() {
            log::debug!("Page lookup for '{}' returned {}", title, response.status());
            return Ok(None);
        }

        let data = http::read_json(SERVICE, response).await?;
        self.first_result(&data)
    }

    /// Append a markdown section below a horizontal rule
    ///
    /// Returns `Ok(false)` without writing when the current page cannot be fetched.
    pub async fn append_to_page(&self, page_id: &str, markdown: &str) -> Result<bool, ApiError> {
        let response = self
            .request(reqwest::Method::GET, &self.content_url(page_id))
            .query(&[("expand", "body.storage,version")])
            .send()
            .await
            .map_err(ApiError::transport(SERVICE))?;

        if !response.status().is_success() {
            log::warn!("Failed to get page {}: {}", page_id, response.status());
            return Ok(false);
        }

        let data = http::read_json(SERVICE, response).await?;
        let page = self.page_from_json(&data)?;
        let combined = appended_body(page.body.as_deref().unwrap_or(""), markdown);

        self.update_page(page_id, &page.title, &combined, page.version)
            .await?;
        Ok(true)
    }

    /// First page of a search response; `None` when `results` is empty or absent
    fn first_result(&self, data: &serde_json::Value) -> Result<Option<Page>, ApiError> {
        match data["results"].as_array().and_then(|r| r.first()) {
            Some(first) => Ok(Some(self.page_from_json(first)?)),
            None => Ok(None),
        }
    }

    fn page_from_json(&self, data: &serde_json::Value) -> Result<Page, ApiError> {
        let id = data["id"]
            .as_str()
            .ok_or_else(|| ApiError::malformed(SERVICE, "page has no id"))?
            .to_string();

        Ok(Page {
            url: self.page_url(&id),
            title: data["title"].as_str().unwrap_or("").to_string(),
            version: data["version"]["number"].as_u64().unwrap_or(1),
            body: data["body"]["storage"]["value"]
                .as_str()
                .map(|s| s.to_string()),
            id,
        })
    }
}

fn storage_body(storage_html: &str) -> serde_json::Value {
    json!({
        "storage": {
            "value": storage_html,
            "representation": "storage",
        }
    })
}

fn create_payload(
    space_key: &str,
    title: &str,
    storage_html: &str,
    parent_id: Option<&str>,
) -> serde_json::Value {
    let mut payload = json!({
        "type": "page",
        "title": title,
        "space": {"key": space_key},
        "body": storage_body(storage_html),
    });
    if let Some(parent_id) = parent_id {
        payload["ancestors"] = json!([{ "id": parent_id }]);
    }
    payload
}

fn update_payload(title: &str, storage_html: &str, version: u64) -> serde_json::Value {
    json!({
        "version": {"number": version + 1},
        "title": title,
        "type": "page",
        "body": storage_body(storage_html),
    })
}

/// Existing storage markup, a rule, then the converted addition
fn appended_body(current: &str, markdown: &str) -> String {
    format!("{}<hr/>{}", current, markup::convert(markdown))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> ConfluenceClient {
        let config = ConfluenceConfig {
            url: "https://x.atlassian.net/wiki".to_string(),
            email: "bot@x.io".to_string(),
            api_token: "tok".to_string(),
            space_key: "ENG".to_string(),
        };
        ConfluenceClient::new(&config, 30).unwrap()
    }

    #[test]
    fn test_page_url() {
        let client = test_client();
        assert_eq!(
            client.page_url("98765"),
            "https://x.atlassian.net/wiki/pages/viewpage.action?pageId=98765"
        );
    }

    #[test]
    fn test_create_payload_with_parent() {
        let payload = create_payload("ENG", "Sprint 4", "<p>x</p>", Some("123"));
        assert_eq!(payload["type"], "page");
        assert_eq!(payload["space"]["key"], "ENG");
        assert_eq!(payload["body"]["storage"]["value"], "<p>x</p>");
        assert_eq!(payload["body"]["storage"]["representation"], "storage");
        assert_eq!(payload["ancestors"][0]["id"], "123");
    }

    #[test]
    fn test_create_payload_without_parent() {
        let payload = create_payload("ENG", "Sprint 4", "<p>x</p>", None);
        assert!(payload.get("ancestors").is_none());
    }

    #[test]
    fn test_update_payload_bumps_version() {
        let payload = update_payload("Sprint 4", "<p>y</p>", 7);
        assert_eq!(payload["version"]["number"], 8);
        assert_eq!(payload["title"], "Sprint 4");
    }

    #[test]
    fn test_appended_body_converts_once() {
        let body = appended_body("<p>old</p>", "**new**");
        assert_eq!(body, "<p>old</p><hr/><p><strong>new</strong></p>");
    }

    #[test]
    fn test_page_from_json() {
        let client = test_client();
        let page = client
            .page_from_json(&json!({
                "id": "42",
                "title": "Daily Standup",
                "version": {"number": 3},
                "body": {"storage": {"value": "<p>hi</p>"}}
            }))
            .unwrap();

        assert_eq!(page.version, 3);
        assert_eq!(page.body.as_deref(), Some("<p>hi</p>"));
        assert!(page.url.ends_with("pageId=42"));
    }

    #[test]
    fn test_page_without_id_is_malformed() {
        let client = test_client();
        assert!(client.page_from_json(&json!({"title": "x"})).is_err());
    }

    #[test]
    fn test_title_lookup_takes_first_result() {
        let client = test_client();
        let page = client
            .first_result(&json!({
                "results": [
                    {"id": "7", "title": "Daily Standup - 2024-05-01", "version": {"number": 2}},
                    {"id": "8", "title": "Daily Standup - 2024-05-01", "version": {"number": 1}}
                ],
                "size": 2
            }))
            .unwrap()
            .unwrap();

        assert_eq!(page.id, "7");
        assert_eq!(page.version, 2);
        assert!(page.body.is_none());
    }

    #[test]
    fn test_title_lookup_without_results() {
        let client = test_client();
        assert!(client
            .first_result(&json!({"results": [], "size": 0}))
            .unwrap()
            .is_none());
        assert!(client.first_result(&json!({})).unwrap().is_none());
    }
}
