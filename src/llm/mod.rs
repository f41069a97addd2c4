//! Anthropic Messages API client
//!
//! One client per agent run. The client owns its [`UsageAccountant`], so cost
//! reporting goes through the client that made the call.

pub mod usage;

pub use usage::{Pricing, UsageAccountant};

use crate::config::{AnthropicConfig, LlmSettings};
use crate::http::{self, ApiError};
use serde::{Deserialize, Serialize};
use serde_json::json;

const SERVICE: &str = "Anthropic";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Text produced by one generation call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Generation {
    pub content: String,
    pub tokens_used: u64,
    pub model: String,
}

pub struct ClaudeClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    usage: UsageAccountant,
}

impl ClaudeClient {
    pub fn new(
        config: &AnthropicConfig,
        settings: &LlmSettings,
        pricing: Pricing,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            client: http::build_client(settings.timeout_secs)?,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            model: settings.model.clone(),
            usage: UsageAccountant::with_pricing(pricing),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn usage(&self) -> &UsageAccountant {
        &self.usage
    }

    /// Estimated cost of the most recent call
    pub fn cost(&self) -> f64 {
        self.usage.estimate_cost()
    }

    /// Send a single-turn prompt and return the first text block
    pub async fn generate(
        &mut self,
        prompt: &str,
        max_tokens: u32,
        system: Option<&str>,
    ) -> Result<Generation, ApiError> {
        let body = build_request_body(&self.model, prompt, max_tokens, system);
        log::debug!(
            "Calling {} ({} prompt chars, max_tokens {})",
            self.model,
            prompt.len(),
            max_tokens
        );

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::transport(SERVICE))?;

        let response = http::expect_success(SERVICE, response).await?;
        let data = http::read_json(SERVICE, response).await?;
        self.record_response(&data)
    }

    /// Parse a messages response and record its token total
    fn record_response(&mut self, data: &serde_json::Value) -> Result<Generation, ApiError> {
        let (content, tokens_used) = parse_response(data)?;

        self.usage.record_usage(tokens_used);
        log::debug!("{} returned {} chars, {} tokens", self.model, content.len(), tokens_used);

        Ok(Generation {
            content,
            tokens_used,
            model: self.model.clone(),
        })
    }
}

fn build_request_body(
    model: &str,
    prompt: &str,
    max_tokens: u32,
    system: Option<&str>,
) -> serde_json::Value {
    let mut body = json!({
        "model": model,
        "max_tokens": max_tokens,
        "messages": [{"role": "user", "content": prompt}],
    });
    if let Some(system) = system {
        body["system"] = json!(system);
    }
    body
}

/// Extract the first text block and `input_tokens + output_tokens`
fn parse_response(data: &serde_json::Value) -> Result<(String, u64), ApiError> {
    let content = data["content"]
        .as_array()
        .and_then(|blocks| blocks.iter().find_map(|b| b["text"].as_str()))
        .ok_or_else(|| ApiError::malformed(SERVICE, "response has no text content"))?
        .to_string();

    let usage = &data["usage"];
    let tokens = usage["input_tokens"].as_u64().unwrap_or(0)
        + usage["output_tokens"].as_u64().unwrap_or(0);

    Ok((content, tokens))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_without_system() {
        let body = build_request_body("claude-x", "hello", 2000, None);
        assert_eq!(body["model"], "claude-x");
        assert_eq!(body["max_tokens"], 2000);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hello");
        assert!(body.get("system").is_none());
    }

    #[test]
    fn test_request_body_with_system() {
        let body = build_request_body("claude-x", "hello", 10, Some("be brief"));
        assert_eq!(body["system"], "be brief");
    }

    #[test]
    fn test_parse_response_sums_tokens() {
        let data = json!({
            "content": [{"type": "text", "text": "def test_ok(): pass"}],
            "usage": {"input_tokens": 812, "output_tokens": 188}
        });
        let (content, tokens) = parse_response(&data).unwrap();
        assert_eq!(content, "def test_ok(): pass");
        assert_eq!(tokens, 1000);
    }

    #[test]
    fn test_parse_response_without_text() {
        let data = json!({"content": [], "usage": {"input_tokens": 1, "output_tokens": 0}});
        assert!(parse_response(&data).is_err());
    }

    #[test]
    fn test_client_owns_its_accountant() {
        let config = AnthropicConfig {
            api_key: "sk-test".to_string(),
            base_url: "http://localhost:1".to_string(),
        };
        let mut client =
            ClaudeClient::new(&config, &LlmSettings::default(), Pricing::default()).unwrap();
        let generation = client
            .record_response(&json!({
                "content": [{"type": "text", "text": "def test_ok(): pass"}],
                "usage": {"input_tokens": 700, "output_tokens": 300}
            }))
            .unwrap();
        assert_eq!(generation.tokens_used, 1000);
        assert_eq!(client.usage().tokens_used(), 1000);
        assert!((client.cost() - 0.0066).abs() < 1e-12);

        // a failed parse leaves the previous total in place
        assert!(client.record_response(&json!({"content": []})).is_err());
        assert_eq!(client.usage().tokens_used(), 1000);

        let other =
            ClaudeClient::new(&config, &LlmSettings::default(), Pricing::default()).unwrap();
        assert_eq!(other.usage().tokens_used(), 0);
    }
}
