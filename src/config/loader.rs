// Settings file loading
//
// Lookup order, later files override earlier ones key by key:
// 1. Global (~/.config/sdlc-agents/config.toml)
// 2. Project (./sdlc-agents.toml)
// 3. Explicit --config path

use super::credentials::ConfigError;
use crate::llm::usage::Pricing;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const PROJECT_SETTINGS_FILE: &str = "sdlc-agents.toml";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Tunable agent settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub pricing: Pricing,
    #[serde(default)]
    pub limits: LimitSettings,
    #[serde(default)]
    pub runner: RunnerSettings,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub planning: PlanningSettings,
    #[serde(default)]
    pub deploy: DeploySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_unit_test_max_tokens")]
    pub unit_test_max_tokens: u32,
    #[serde(default = "default_qa_max_tokens")]
    pub qa_max_tokens: u32,
    #[serde(default = "default_standup_max_tokens")]
    pub standup_max_tokens: u32,
    #[serde(default = "default_analysis_max_tokens")]
    pub analysis_max_tokens: u32,
    #[serde(default = "default_review_max_tokens")]
    pub review_max_tokens: u32,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_model() -> String { DEFAULT_MODEL.to_string() }
fn default_unit_test_max_tokens() -> u32 { 2000 }
fn default_qa_max_tokens() -> u32 { 2500 }
fn default_standup_max_tokens() -> u32 { 2500 }
fn default_analysis_max_tokens() -> u32 { 4000 }
fn default_review_max_tokens() -> u32 { 2000 }
fn default_llm_timeout() -> u64 { 120 }

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            unit_test_max_tokens: default_unit_test_max_tokens(),
            qa_max_tokens: default_qa_max_tokens(),
            standup_max_tokens: default_standup_max_tokens(),
            analysis_max_tokens: default_analysis_max_tokens(),
            review_max_tokens: default_review_max_tokens(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

/// Truncation limits for prompts, comments and chat messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitSettings {
    /// Changed files to generate unit tests for
    #[serde(default = "default_unit_test_files")]
    pub unit_test_files: usize,
    /// Changed files listed in the QA prompt
    #[serde(default = "default_qa_prompt_files")]
    pub qa_prompt_files: usize,
    #[serde(default = "default_unit_test_diff_chars")]
    pub unit_test_diff_chars: usize,
    #[serde(default = "default_review_diff_chars")]
    pub review_diff_chars: usize,
    #[serde(default = "default_commit_comment_output_chars")]
    pub commit_comment_output_chars: usize,
    #[serde(default = "default_pr_comment_output_chars")]
    pub pr_comment_output_chars: usize,
    #[serde(default = "default_chat_output_chars")]
    pub chat_output_chars: usize,
    #[serde(default = "default_chat_summary_chars")]
    pub chat_summary_chars: usize,
    /// Issues and PRs fetched for the standup report
    #[serde(default = "default_activity_items")]
    pub activity_items: usize,
}

fn default_unit_test_files() -> usize { 3 }
fn default_qa_prompt_files() -> usize { 10 }
fn default_unit_test_diff_chars() -> usize { 1000 }
fn default_review_diff_chars() -> usize { 3000 }
fn default_commit_comment_output_chars() -> usize { 1500 }
fn default_pr_comment_output_chars() -> usize { 2000 }
fn default_chat_output_chars() -> usize { 500 }
fn default_chat_summary_chars() -> usize { 300 }
fn default_activity_items() -> usize { 10 }

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            unit_test_files: default_unit_test_files(),
            qa_prompt_files: default_qa_prompt_files(),
            unit_test_diff_chars: default_unit_test_diff_chars(),
            review_diff_chars: default_review_diff_chars(),
            commit_comment_output_chars: default_commit_comment_output_chars(),
            pr_comment_output_chars: default_pr_comment_output_chars(),
            chat_output_chars: default_chat_output_chars(),
            chat_summary_chars: default_chat_summary_chars(),
            activity_items: default_activity_items(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerSettings {
    #[serde(default = "default_test_command")]
    pub test_command: String,
    #[serde(default = "default_unit_test_timeout")]
    pub unit_test_timeout_secs: u64,
    #[serde(default = "default_qa_test_timeout")]
    pub qa_test_timeout_secs: u64,
    #[serde(default = "default_deploy_step_timeout")]
    pub deploy_step_timeout_secs: u64,
}

fn default_test_command() -> String { "pytest".to_string() }
fn default_unit_test_timeout() -> u64 { 60 }
fn default_qa_test_timeout() -> u64 { 120 }
fn default_deploy_step_timeout() -> u64 { 300 }

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            test_command: default_test_command(),
            unit_test_timeout_secs: default_unit_test_timeout(),
            qa_test_timeout_secs: default_qa_test_timeout(),
            deploy_step_timeout_secs: default_deploy_step_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_webhook_timeout")]
    pub webhook_timeout_secs: u64,
}

fn default_http_timeout() -> u64 { 30 }
fn default_webhook_timeout() -> u64 { 10 }

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_http_timeout(),
            webhook_timeout_secs: default_webhook_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningSettings {
    /// Developers assumed by the sprint planning prompt
    #[serde(default = "default_team_size")]
    pub team_size: u32,
}

fn default_team_size() -> u32 { 5 }

impl Default for PlanningSettings {
    fn default() -> Self {
        Self {
            team_size: default_team_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploySettings {
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Link attached to the deployment notification
    #[serde(default = "default_app_url")]
    pub app_url: Option<String>,
}

fn default_environment() -> String { "Local Staging".to_string() }
fn default_app_url() -> Option<String> { Some("http://localhost:8000".to_string()) }

impl Default for DeploySettings {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            app_url: default_app_url(),
        }
    }
}

/// Settings loader
pub struct ConfigLoader {
    global_path: Option<PathBuf>,
    project_path: Option<PathBuf>,
    explicit_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            global_path: Self::get_global_config_path(),
            project_path: Some(PathBuf::from(PROJECT_SETTINGS_FILE)),
            explicit_path: None,
        }
    }

    /// Look for the project file in `dir` instead of the working directory
    pub fn with_project_dir(mut self, dir: &Path) -> Self {
        self.project_path = Some(dir.join(PROJECT_SETTINGS_FILE));
        self
    }

    pub fn with_explicit_path(mut self, path: Option<PathBuf>) -> Self {
        self.explicit_path = path;
        self
    }

    pub fn without_global(mut self) -> Self {
        self.global_path = None;
        self
    }

    fn get_global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("sdlc-agents").join("config.toml"))
    }

    /// Load and merge every settings file that exists
    ///
    /// An explicit path must exist; global and project files are optional.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let mut merged = toml::Table::new();

        for path in [&self.global_path, &self.project_path].into_iter().flatten() {
            if path.exists() {
                log::debug!("Loading settings from {}", path.display());
                merge_tables(&mut merged, read_table(path)?);
            }
        }

        if let Some(path) = &self.explicit_path {
            log::debug!("Loading settings from {}", path.display());
            merge_tables(&mut merged, read_table(path)?);
        }

        toml::Value::Table(merged)
            .try_into()
            .map_err(|source| ConfigError::Parse {
                path: "merged settings".to_string(),
                source,
            })
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn read_table(path: &Path) -> Result<toml::Table, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Recursively overlay `overlay` onto `base`
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.llm.model, DEFAULT_MODEL);
        assert_eq!(settings.pricing.input_per_million, 3.00);
        assert_eq!(settings.pricing.output_per_million, 15.00);
        assert_eq!(settings.limits.unit_test_files, 3);
        assert_eq!(settings.runner.test_command, "pytest");
        assert_eq!(settings.http.timeout_secs, 30);
        assert_eq!(settings.planning.team_size, 5);
        assert_eq!(settings.deploy.environment, "Local Staging");
        assert_eq!(settings.deploy.app_url.as_deref(), Some("http://localhost:8000"));
    }

    #[test]
    fn test_load_without_files_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = ConfigLoader::new()
            .without_global()
            .with_project_dir(temp_dir.path())
            .load()
            .unwrap();
        assert_eq!(settings.llm.qa_max_tokens, 2500);
    }

    #[test]
    fn test_partial_project_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(PROJECT_SETTINGS_FILE),
            "[pricing]\noutput_per_million = 75.0\n\n[runner]\ntest_command = \"python -m pytest\"\n",
        )
        .unwrap();

        let settings = ConfigLoader::new()
            .without_global()
            .with_project_dir(temp_dir.path())
            .load()
            .unwrap();

        assert_eq!(settings.pricing.output_per_million, 75.0);
        assert_eq!(settings.pricing.input_per_million, 3.00);
        assert_eq!(settings.runner.test_command, "python -m pytest");
        assert_eq!(settings.runner.qa_test_timeout_secs, 120);
    }

    #[test]
    fn test_explicit_file_overrides_project_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(PROJECT_SETTINGS_FILE),
            "[llm]\nmodel = \"project-model\"\nqa_max_tokens = 900\n",
        )
        .unwrap();
        let explicit = temp_dir.path().join("override.toml");
        fs::write(&explicit, "[llm]\nmodel = \"explicit-model\"\n").unwrap();

        let settings = ConfigLoader::new()
            .without_global()
            .with_project_dir(temp_dir.path())
            .with_explicit_path(Some(explicit))
            .load()
            .unwrap();

        assert_eq!(settings.llm.model, "explicit-model");
        assert_eq!(settings.llm.qa_max_tokens, 900);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = ConfigLoader::new()
            .without_global()
            .with_project_dir(temp_dir.path())
            .with_explicit_path(Some(temp_dir.path().join("nope.toml")))
            .load();
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(PROJECT_SETTINGS_FILE), "[llm\nmodel=").unwrap();
        let result = ConfigLoader::new()
            .without_global()
            .with_project_dir(temp_dir.path())
            .load();
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
