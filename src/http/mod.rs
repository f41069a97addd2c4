// Shared HTTP plumbing for the REST clients

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use thiserror::Error;

pub const USER_AGENT: &str = "sdlc-agents";

/// Errors raised by the GitHub, Jira, Confluence and Anthropic clients
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} API error ({status}): {body}")]
    Status {
        service: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("{service} returned an unexpected response: {message}")]
    Malformed {
        service: &'static str,
        message: String,
    },
}

impl ApiError {
    pub fn transport(service: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| ApiError::Transport { service, source }
    }

    pub fn malformed(service: &'static str, message: impl Into<String>) -> Self {
        ApiError::Malformed {
            service,
            message: message.into(),
        }
    }

    /// HTTP status of a rejected request, if the server answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Build a client with a fixed request timeout
pub fn build_client(timeout_secs: u64) -> Result<Client, ApiError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(USER_AGENT)
        .build()
        .map_err(ApiError::transport("http"))
}

/// `Authorization` header value for Atlassian Basic auth
pub fn basic_auth_header(email: &str, api_token: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", email, api_token)))
}

/// Fail unless the response status is exactly `expected`
pub async fn expect_status(
    service: &'static str,
    response: Response,
    expected: StatusCode,
) -> Result<Response, ApiError> {
    if response.status() == expected {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        service,
        status,
        body,
    })
}

/// Fail unless the response status is 2xx
pub async fn expect_success(service: &'static str, response: Response) -> Result<Response, ApiError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        service,
        status,
        body,
    })
}

/// Decode a JSON response body
pub async fn read_json(
    service: &'static str,
    response: Response,
) -> Result<serde_json::Value, ApiError> {
    response
        .json()
        .await
        .map_err(|e| ApiError::malformed(service, format!("Failed to parse response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_auth_header() {
        // base64("user@example.com:token")
        assert_eq!(
            basic_auth_header("user@example.com", "token"),
            "Basic dXNlckBleGFtcGxlLmNvbTp0b2tlbg=="
        );
    }

    #[test]
    fn test_status_error_display() {
        let err = ApiError::Status {
            service: "Jira",
            status: StatusCode::BAD_REQUEST,
            body: "bad field".to_string(),
        };
        assert_eq!(err.to_string(), "Jira API error (400 Bad Request): bad field");
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn test_malformed_has_no_status() {
        let err = ApiError::malformed("GitHub", "missing id");
        assert!(err.status().is_none());
        assert!(err.to_string().contains("missing id"));
    }
}
