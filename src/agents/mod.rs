//! SDLC agents, one per CI trigger
//!
//! Every agent runs a single sequential pass and returns the process exit
//! code. Required collaborators (the model, the repository host for most
//! agents) fail the run; notifications and cross-links only log a warning.

pub mod deploy;
pub mod pm_standup;
pub mod pr_review;
pub mod qa;
pub mod requirements;
pub mod sprint_plan;

use crate::config::{
    AnthropicConfig, ConfluenceConfig, GitHubConfig, JiraConfig, Settings, SlackConfig,
};
use crate::confluence::ConfluenceClient;
use crate::github::GitHubClient;
use crate::jira::JiraClient;
use crate::llm::ClaudeClient;
use crate::slack::SlackNotifier;
use crate::templates::Prompts;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Header of every generated pytest module
pub const GENERATED_TEST_PRELUDE: &str = "import pytest\nimport os\nimport sys\n\n\
# Add project root to path\n\
sys.path.insert(0, os.path.dirname(os.path.dirname(__file__)))\n\n";

/// What an agent run needs besides its own arguments
pub struct AgentEnv {
    pub settings: Settings,
    /// Checkout the agent operates on
    pub workdir: PathBuf,
}

impl AgentEnv {
    pub fn new(settings: Settings, workdir: PathBuf) -> Self {
        Self { settings, workdir }
    }

    pub fn claude(&self) -> Result<ClaudeClient> {
        let config = AnthropicConfig::from_env()?;
        Ok(ClaudeClient::new(
            &config,
            &self.settings.llm,
            self.settings.pricing,
        )?)
    }

    pub fn github(&self) -> Result<GitHubClient> {
        let config = GitHubConfig::from_env()?;
        Ok(GitHubClient::new(&config, self.settings.http.timeout_secs)?)
    }

    /// GitHub client when credentials are present, else `None` with a warning
    pub fn optional_github(&self) -> Option<GitHubClient> {
        match self.github() {
            Ok(client) => Some(client),
            Err(e) => {
                log::warn!("GitHub unavailable: {:#}", e);
                None
            }
        }
    }

    pub fn jira(&self) -> Result<JiraClient> {
        let config = JiraConfig::from_env()?;
        Ok(JiraClient::new(&config, self.settings.http.timeout_secs)?)
    }

    /// Jira client when credentials are present, else `None` with a warning
    pub fn optional_jira(&self) -> Option<JiraClient> {
        match self.jira() {
            Ok(client) => Some(client),
            Err(e) => {
                log::warn!("Jira unavailable: {:#}", e);
                None
            }
        }
    }

    pub fn confluence(&self) -> Result<ConfluenceClient> {
        let config = ConfluenceConfig::from_env()?;
        Ok(ConfluenceClient::new(
            &config,
            self.settings.http.timeout_secs,
        )?)
    }

    pub fn slack(&self) -> Result<SlackNotifier> {
        Ok(SlackNotifier::new(
            &SlackConfig::from_env(),
            self.settings.http.webhook_timeout_secs,
        )?)
    }

    pub fn prompts(&self) -> Prompts {
        Prompts::for_project(&self.workdir)
    }

    /// Write a workdir-relative file, creating parent directories
    pub fn write_file(&self, relative: &str, contents: &str) -> Result<PathBuf> {
        let path = self.workdir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.workdir.join(relative).exists()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.workdir.join(relative)
    }
}

/// Prelude plus test bodies separated by blank lines
pub fn generated_test_module<S: AsRef<str>>(bodies: &[S]) -> String {
    let joined = bodies
        .iter()
        .map(|b| b.as_ref())
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("{}{}", GENERATED_TEST_PRELUDE, joined)
}

/// Only Python sources are handed to the test generators
pub fn is_python_source(path: &str) -> bool {
    Path::new(path)
        .extension()
        .map(|ext| ext == "py")
        .unwrap_or(false)
}

/// Closing lines of a run in the log
pub fn log_summary(title: &str, lines: &[String]) {
    log::info!("{}", "=".repeat(60));
    log::info!("{}", title);
    for line in lines {
        log::info!("  {}", line);
    }
    log::info!("{}", "=".repeat(60));
}
