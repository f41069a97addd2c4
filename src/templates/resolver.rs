// Template resolution with cascading lookup
//
// Resolution order:
// 1. Project (.sdlc-agents/templates/) - repository-specific prompts
// 2. Global (~/.config/sdlc-agents/templates/) - user's prompts
// 3. Builtin - compiled-in default templates

use crate::templates::builtin;
use anyhow::{anyhow, Result};
use log::{debug, info};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const TEMPLATES_DIR: &str = "templates";
pub const PROJECT_DIR: &str = ".sdlc-agents";

/// Template source indicating where a template was resolved from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Project,
    Global,
    Builtin,
}

/// Resolved template info
#[derive(Debug, Clone)]
pub struct ResolvedTemplate {
    pub name: String,
    pub content: String,
    pub source: TemplateSource,
    /// Path to the template file (if file-based)
    pub path: Option<PathBuf>,
}

/// Template resolver with cascading lookup
pub struct TemplateResolver {
    project_path: Option<PathBuf>,
    global_dir: Option<PathBuf>,
    cache: HashMap<String, ResolvedTemplate>,
}

impl TemplateResolver {
    /// Create a resolver that only knows the global and builtin templates
    pub fn new() -> Self {
        Self {
            project_path: None,
            global_dir: dirs::config_dir().map(|d| d.join("sdlc-agents").join(TEMPLATES_DIR)),
            cache: HashMap::new(),
        }
    }

    /// Set the project path for project-level templates
    pub fn with_project_path(mut self, path: &Path) -> Self {
        self.project_path = Some(path.to_path_buf());
        self
    }

    /// Override (or with `None`, disable) the global templates directory
    pub fn with_global_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.global_dir = dir;
        self
    }

    /// Resolve a template by name; the first match wins
    pub fn resolve(&mut self, name: &str) -> Result<ResolvedTemplate> {
        if let Some(cached) = self.cache.get(name) {
            debug!(
                "Template '{}' resolved from cache (source: {:?})",
                name, cached.source
            );
            return Ok(cached.clone());
        }

        let template = if let Some(template) =
            Self::try_file_template(name, self.project_template_path(name), TemplateSource::Project)?
        {
            info!("Template '{}' resolved from project: {:?}", name, template.path);
            template
        } else if let Some(template) =
            Self::try_file_template(name, self.global_template_path(name), TemplateSource::Global)?
        {
            info!("Template '{}' resolved from global: {:?}", name, template.path);
            template
        } else if let Some(content) = builtin::get_builtin_template(name) {
            debug!("Template '{}' resolved from builtin templates", name);
            ResolvedTemplate {
                name: name.to_string(),
                content: content.to_string(),
                source: TemplateSource::Builtin,
                path: None,
            }
        } else {
            return Err(anyhow!("Template '{}' not found in any location", name));
        };

        self.cache.insert(name.to_string(), template.clone());
        Ok(template)
    }

    /// Check if a template exists in any location
    pub fn exists(&self, name: &str) -> bool {
        self.project_template_path(name).map(|p| p.exists()).unwrap_or(false)
            || self.global_template_path(name).map(|p| p.exists()).unwrap_or(false)
            || builtin::get_builtin_template(name).is_some()
    }

    fn project_template_path(&self, name: &str) -> Option<PathBuf> {
        self.project_path.as_ref().map(|p| {
            p.join(PROJECT_DIR)
                .join(TEMPLATES_DIR)
                .join(format!("{}.tera", name))
        })
    }

    fn global_template_path(&self, name: &str) -> Option<PathBuf> {
        self.global_dir
            .as_ref()
            .map(|d| d.join(format!("{}.tera", name)))
    }

    fn try_file_template(
        name: &str,
        path: Option<PathBuf>,
        source: TemplateSource,
    ) -> Result<Option<ResolvedTemplate>> {
        let Some(path) = path.filter(|p| p.exists()) else {
            return Ok(None);
        };
        debug!("Found {:?} template at {:?}", source, path);
        let content = fs::read_to_string(&path)
            .map_err(|e| anyhow!("Failed to read template {:?}: {}", path, e))?;
        Ok(Some(ResolvedTemplate {
            name: name.to_string(),
            content,
            source,
            path: Some(path),
        }))
    }
}

impl Default for TemplateResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project_templates(temp_dir: &TempDir) -> PathBuf {
        let dir = temp_dir.path().join(PROJECT_DIR).join(TEMPLATES_DIR);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_falls_back_to_builtin() {
        let mut resolver = TemplateResolver::new().with_global_dir(None);
        let template = resolver.resolve(builtin::PR_REVIEW).unwrap();
        assert_eq!(template.source, TemplateSource::Builtin);
        assert!(template.path.is_none());
    }

    #[test]
    fn test_project_overrides_builtin() {
        let temp_dir = TempDir::new().unwrap();
        let dir = project_templates(&temp_dir);
        fs::write(dir.join("pr_review.tera"), "Review {{ pr_title }}").unwrap();

        let mut resolver = TemplateResolver::new()
            .with_global_dir(None)
            .with_project_path(temp_dir.path());
        let template = resolver.resolve(builtin::PR_REVIEW).unwrap();

        assert_eq!(template.source, TemplateSource::Project);
        assert_eq!(template.content, "Review {{ pr_title }}");
    }

    #[test]
    fn test_project_overrides_global() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        fs::write(project_templates(&project).join("daily_standup.tera"), "project").unwrap();
        fs::write(global.path().join("daily_standup.tera"), "global").unwrap();
        fs::write(global.path().join("pr_review.tera"), "global review").unwrap();

        let mut resolver = TemplateResolver::new()
            .with_global_dir(Some(global.path().to_path_buf()))
            .with_project_path(project.path());

        assert_eq!(resolver.resolve("daily_standup").unwrap().content, "project");
        let review = resolver.resolve("pr_review").unwrap();
        assert_eq!(review.source, TemplateSource::Global);
        assert_eq!(review.content, "global review");
    }

    #[test]
    fn test_resolution_is_cached() {
        let temp_dir = TempDir::new().unwrap();
        let dir = project_templates(&temp_dir);
        fs::write(dir.join("custom.tera"), "first").unwrap();

        let mut resolver = TemplateResolver::new()
            .with_global_dir(None)
            .with_project_path(temp_dir.path());
        assert_eq!(resolver.resolve("custom").unwrap().content, "first");

        fs::write(dir.join("custom.tera"), "second").unwrap();
        assert_eq!(resolver.resolve("custom").unwrap().content, "first");
    }

    #[test]
    fn test_unknown_template() {
        let mut resolver = TemplateResolver::new().with_global_dir(None);
        assert!(!resolver.exists("nope"));
        assert!(resolver.resolve("nope").is_err());
    }
}
