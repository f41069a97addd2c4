// Template rendering engine using Tera

use anyhow::{anyhow, Result};
use serde::Serialize;
use tera::{Context, Tera};

/// Variables handed to a prompt template
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    inner: Context,
}

impl TemplateContext {
    /// Create a context carrying the current date
    pub fn new() -> Self {
        let mut inner = Context::new();
        inner.insert("current_date", &chrono::Utc::now().format("%Y-%m-%d").to_string());
        Self { inner }
    }

    /// Add a variable
    pub fn with<T: Serialize + ?Sized>(mut self, key: &str, value: &T) -> Self {
        self.inner.insert(key, value);
        self
    }

    pub fn as_tera(&self) -> &Context {
        &self.inner
    }
}

/// Template engine for rendering prompts
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Create a new template engine
    pub fn new() -> Self {
        Self {
            tera: Tera::default(),
        }
    }

    /// Add a template from string
    pub fn add_template(&mut self, name: &str, template: &str) -> Result<()> {
        self.tera
            .add_raw_template(name, template)
            .map_err(|e| anyhow!("Failed to add template '{}': {}", name, e))
    }

    /// Render a template with context
    pub fn render(&self, template_name: &str, context: &TemplateContext) -> Result<String> {
        self.tera
            .render(template_name, context.as_tera())
            .map_err(|e| anyhow!("Failed to render template '{}': {}", template_name, e))
    }

    /// Check if a template exists
    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_simple_template() {
        let mut engine = TemplateEngine::new();
        engine.add_template("greeting", "Hello {{ name }}!").unwrap();

        let ctx = TemplateContext::new().with("name", "QA");
        assert_eq!(engine.render("greeting", &ctx).unwrap(), "Hello QA!");
        assert!(engine.has_template("greeting"));
    }

    #[test]
    fn test_html_is_not_escaped() {
        let mut engine = TemplateEngine::new();
        engine.add_template("diff", "{{ diff }}").unwrap();

        let ctx = TemplateContext::new().with("diff", "if a < b && c > d");
        assert_eq!(engine.render("diff", &ctx).unwrap(), "if a < b && c > d");
    }

    #[test]
    fn test_current_date_is_available() {
        let mut engine = TemplateEngine::new();
        engine.add_template("date", "{{ current_date }}").unwrap();

        let rendered = engine.render("date", &TemplateContext::new()).unwrap();
        assert_eq!(rendered.len(), 10);
    }

    #[test]
    fn test_invalid_template_is_rejected() {
        let mut engine = TemplateEngine::new();
        assert!(engine.add_template("broken", "{% if %}").is_err());
    }

    #[test]
    fn test_missing_variable_fails_render() {
        let mut engine = TemplateEngine::new();
        engine.add_template("t", "{{ missing }}").unwrap();
        assert!(engine.render("t", &TemplateContext::new()).is_err());
    }
}
