// Service credentials read from the CI environment
//
// Credentials are opaque: they are only passed through to request headers.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variables: {}", .0.join(", "))]
    MissingEnv(Vec<&'static str>),

    #[error("Invalid GITHUB_REPOSITORY '{0}', expected owner/repo")]
    InvalidRepository(String),

    #[error("Failed to read settings file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Collects required variables and reports every missing one at once
struct EnvReader<F> {
    lookup: F,
    missing: Vec<&'static str>,
}

impl<F: Fn(&str) -> Option<String>> EnvReader<F> {
    fn new(lookup: F) -> Self {
        Self {
            lookup,
            missing: Vec::new(),
        }
    }

    fn required(&mut self, key: &'static str) -> String {
        match (self.lookup)(key).filter(|v| !v.trim().is_empty()) {
            Some(value) => value,
            None => {
                self.missing.push(key);
                String::new()
            }
        }
    }

    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    fn finish(self) -> Result<(), ConfigError> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingEnv(self.missing))
        }
    }
}

fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// GitHub repository and token (`GITHUB_REPOSITORY`, `GITHUB_TOKEN`)
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub token: String,
    pub owner: String,
    pub repo: String,
}

impl GitHubConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(process_env)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut env = EnvReader::new(lookup);
        let repository = env.required("GITHUB_REPOSITORY");
        let token = env.required("GITHUB_TOKEN");
        env.finish()?;

        let (owner, repo) = parse_repository(&repository)?;
        Ok(Self { token, owner, repo })
    }

    /// `owner/repo`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

fn parse_repository(repository: &str) -> Result<(String, String), ConfigError> {
    match repository.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(ConfigError::InvalidRepository(repository.to_string())),
    }
}

/// Jira Cloud site and project
#[derive(Debug, Clone)]
pub struct JiraConfig {
    pub url: String,
    pub email: String,
    pub api_token: String,
    pub project_key: String,
}

impl JiraConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(process_env)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut env = EnvReader::new(lookup);
        let url = env.required("JIRA_URL");
        let email = env.required("JIRA_EMAIL");
        let api_token = env.required("JIRA_API_TOKEN");
        let project_key = env.required("JIRA_PROJECT_KEY");
        env.finish()?;

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            email,
            api_token,
            project_key,
        })
    }
}

/// Confluence site and space. Shares the Jira account for Basic auth.
#[derive(Debug, Clone)]
pub struct ConfluenceConfig {
    pub url: String,
    pub email: String,
    pub api_token: String,
    pub space_key: String,
}

impl ConfluenceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(process_env)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut env = EnvReader::new(lookup);
        let url = env.required("CONFLUENCE_URL");
        let email = env.required("JIRA_EMAIL");
        let api_token = env.required("JIRA_API_TOKEN");
        let space_key = env.required("CONFLUENCE_SPACE_KEY");
        env.finish()?;

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            email,
            api_token,
            space_key,
        })
    }
}

/// Slack incoming webhook. Absent means notifications are disabled.
#[derive(Debug, Clone, Default)]
pub struct SlackConfig {
    pub webhook_url: Option<String>,
}

impl SlackConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(process_env)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let env = EnvReader::new(lookup);
        Self {
            webhook_url: env.optional("SLACK_WEBHOOK_URL"),
        }
    }
}

pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";

/// Anthropic Messages API key and endpoint
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub base_url: String,
}

impl AnthropicConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(process_env)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut env = EnvReader::new(lookup);
        let api_key = env.required("ANTHROPIC_API_KEY");
        let base_url = env
            .optional("ANTHROPIC_BASE_URL")
            .unwrap_or_else(|| DEFAULT_ANTHROPIC_BASE_URL.to_string());
        env.finish()?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}
