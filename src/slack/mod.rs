// Slack incoming-webhook notifications
//
// Notifications never fail an agent run: every send reports a bool.

pub mod blocks;

use crate::config::SlackConfig;
use crate::http::{self, ApiError};
use serde_json::{json, Value};

pub struct SlackNotifier {
    client: reqwest::Client,
    webhook_url: Option<String>,
}

impl SlackNotifier {
    pub fn new(config: &SlackConfig, timeout_secs: u64) -> Result<Self, ApiError> {
        if config.webhook_url.is_none() {
            log::warn!("SLACK_WEBHOOK_URL not set - notifications disabled");
        }
        Ok(Self {
            client: http::build_client(timeout_secs)?,
            webhook_url: config.webhook_url.clone(),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.webhook_url.is_some()
    }

    /// Post a message; `false` when disabled, rejected or unreachable
    pub async fn send_message(&self, text: &str, blocks: Option<Vec<Value>>) -> bool {
        let Some(webhook_url) = &self.webhook_url else {
            return false;
        };

        let mut payload = json!({ "text": text });
        if let Some(blocks) = blocks {
            payload["blocks"] = Value::Array(blocks);
        }

        match self.client.post(webhook_url).json(&payload).send().await {
            Ok(response) if response.status() == reqwest::StatusCode::OK => {
                log::info!("Slack notification sent");
                true
            }
            Ok(response) => {
                log::warn!("Slack notification failed: {}", response.status());
                false
            }
            Err(e) => {
                log::warn!("Slack error: {}", e);
                false
            }
        }
    }

    pub async fn notify_feature_created(
        &self,
        issue_number: u32,
        title: &str,
        jira_key: &str,
        jira_url: &str,
    ) -> bool {
        let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M UTC").to_string();
        let blocks = blocks::feature_created(issue_number, title, jira_key, jira_url, &timestamp);
        self.send_message(&format!("New Feature: {}", title), Some(blocks))
            .await
    }

    pub async fn notify_ba_complete(
        &self,
        issue_number: u32,
        jira_key: &str,
        confluence_url: &str,
        user_stories: &[String],
    ) -> bool {
        let blocks = blocks::ba_complete(issue_number, jira_key, confluence_url, user_stories);
        self.send_message("BA Analysis Complete", Some(blocks)).await
    }

    pub async fn notify_tests_complete(
        &self,
        pr_number: u32,
        passed: usize,
        failed: usize,
        pr_url: &str,
    ) -> bool {
        let grade = blocks::RunGrade::from_rate(blocks::success_rate(passed, failed));
        let blocks = blocks::tests_complete(pr_number, passed, failed, pr_url);
        self.send_message(&format!("Tests Complete: {}", grade.label()), Some(blocks))
            .await
    }

    pub async fn notify_deployment(&self, environment: &str, success: bool, url: Option<&str>) -> bool {
        let (_, status) = blocks::deployment_status(success);
        let blocks = blocks::deployment(environment, success, url);
        self.send_message(&format!("Deployment {}: {}", status, environment), Some(blocks))
            .await
    }
}
