// Layered configuration: environment credentials plus TOML settings

pub mod credentials;
pub mod loader;

// Re-export main types
pub use credentials::{
    AnthropicConfig, ConfigError, ConfluenceConfig, GitHubConfig, JiraConfig, SlackConfig,
};
pub use loader::{
    ConfigLoader, DeploySettings, HttpSettings, LimitSettings, LlmSettings, PlanningSettings,
    RunnerSettings, Settings,
};

use std::path::{Path, PathBuf};

/// Load settings from the global file, `<project_dir>/sdlc-agents.toml` and an explicit file
pub fn load_settings(project_dir: &Path, explicit_path: Option<PathBuf>) -> Result<Settings, ConfigError> {
    ConfigLoader::new()
        .with_project_dir(project_dir)
        .with_explicit_path(explicit_path)
        .load()
}
