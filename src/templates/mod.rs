// Template system for prompt generation

pub mod builtin;
pub mod engine;
pub mod resolver;

// Re-export main types
pub use engine::{TemplateContext, TemplateEngine};
pub use resolver::{TemplateResolver, TemplateSource};

use crate::utils::truncate_chars;
use anyhow::Result;
use serde::Serialize;
use std::path::Path;

/// Renders the agent prompts, resolving project and global overrides first
pub struct Prompts {
    resolver: TemplateResolver,
    engine: TemplateEngine,
}

impl Prompts {
    pub fn new() -> Self {
        Self {
            resolver: TemplateResolver::new(),
            engine: TemplateEngine::new(),
        }
    }

    /// Also look for overrides under `<project>/.sdlc-agents/templates/`
    pub fn for_project(project_path: &Path) -> Self {
        Self {
            resolver: TemplateResolver::new().with_project_path(project_path),
            engine: TemplateEngine::new(),
        }
    }

    pub fn with_resolver(resolver: TemplateResolver) -> Self {
        Self {
            resolver,
            engine: TemplateEngine::new(),
        }
    }

    /// Render any named template
    pub fn render(&mut self, name: &str, context: &TemplateContext) -> Result<String> {
        if !self.engine.has_template(name) {
            let template = self.resolver.resolve(name)?;
            self.engine.add_template(name, &template.content)?;
        }
        self.engine.render(name, context)
    }

    pub fn ba_analysis(&mut self, title: &str, description: &str) -> Result<String> {
        let ctx = TemplateContext::new()
            .with("title", title)
            .with("description", description);
        self.render(builtin::BA_ANALYSIS, &ctx)
    }

    pub fn extract_user_stories(&mut self, ba_analysis: &str) -> Result<String> {
        let ctx = TemplateContext::new().with("ba_analysis", ba_analysis);
        self.render(builtin::EXTRACT_USER_STORIES, &ctx)
    }

    pub fn sprint_planning(
        &mut self,
        feature_title: &str,
        stories: &[String],
        team_size: u32,
    ) -> Result<String> {
        let ctx = TemplateContext::new()
            .with("feature_title", feature_title)
            .with("stories", stories)
            .with("team_size", &team_size);
        self.render(builtin::SPRINT_PLANNING, &ctx)
    }

    pub fn unit_test_generation(
        &mut self,
        file_path: &str,
        code_changes: &str,
        max_diff_chars: usize,
    ) -> Result<String> {
        let ctx = TemplateContext::new()
            .with("file_path", file_path)
            .with("code_changes", truncate_chars(code_changes, max_diff_chars));
        self.render(builtin::UNIT_TEST_GENERATION, &ctx)
    }

    pub fn qa_automation_tests(
        &mut self,
        pr_title: &str,
        changed_files: &[String],
        max_files: usize,
    ) -> Result<String> {
        let listed = &changed_files[..changed_files.len().min(max_files)];
        let ctx = TemplateContext::new()
            .with("pr_title", pr_title)
            .with("changed_files", listed);
        self.render(builtin::QA_AUTOMATION_TESTS, &ctx)
    }

    pub fn pr_review(
        &mut self,
        pr_title: &str,
        pr_description: Option<&str>,
        diff: &str,
        max_diff_chars: usize,
    ) -> Result<String> {
        let ctx = TemplateContext::new()
            .with("pr_title", pr_title)
            .with("pr_description", pr_description.unwrap_or(""))
            .with("diff", truncate_chars(diff, max_diff_chars));
        self.render(builtin::PR_REVIEW, &ctx)
    }

    /// `metrics` must serialise with `open_issues`, `closed_issues`,
    /// `open_prs` and `merged_prs`
    pub fn daily_standup<M: Serialize>(&mut self, metrics: &M, recent_activity: &str) -> Result<String> {
        let ctx = TemplateContext::new()
            .with("metrics", metrics)
            .with("recent_activity", recent_activity);
        self.render(builtin::DAILY_STANDUP, &ctx)
    }
}

impl Default for Prompts {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn prompts() -> Prompts {
        Prompts::with_resolver(TemplateResolver::new().with_global_dir(None))
    }

    #[test]
    fn test_ba_analysis_default_description() {
        let prompt = prompts().ba_analysis("Price filter", "").unwrap();
        assert!(prompt.contains("Title: Price filter\n"));
        assert!(prompt.contains("Description: No description provided\n"));
    }

    #[test]
    fn test_extract_user_stories_keeps_json_example() {
        let prompt = prompts().extract_user_stories("## Stories").unwrap();
        assert!(prompt.contains("## Stories"));
        assert!(prompt.contains("  {\n    \"title\": \"Short story title (max 60 chars)\","));
    }

    #[test]
    fn test_sprint_planning_story_list() {
        let stories = vec!["SHOP-2".to_string(), "SHOP-3".to_string()];
        let prompt = prompts().sprint_planning("Search", &stories, 5).unwrap();
        assert!(prompt.contains("**User Stories:**\n- SHOP-2\n- SHOP-3\n\n**Team Size:** 5 developers"));
    }

    #[test]
    fn test_unit_test_prompt_truncates_diff() {
        let diff = "x".repeat(1500);
        let prompt = prompts().unit_test_generation("app.py", &diff, 1000).unwrap();
        assert!(prompt.contains(&format!("```\n{}\n```", "x".repeat(1000))));
        assert!(!prompt.contains(&"x".repeat(1001)));
    }

    #[test]
    fn test_qa_prompt_lists_first_files() {
        let files: Vec<String> = (0..12).map(|i| format!("src/m{}.py", i)).collect();
        let prompt = prompts().qa_automation_tests("Add cart", &files, 10).unwrap();
        assert!(prompt.contains("- src/m9.py\n\n**Generate pytest"));
        assert!(!prompt.contains("src/m10.py"));
    }

    #[test]
    fn test_pr_review_without_description() {
        let prompt = prompts().pr_review("Fix", None, "+a", 3000).unwrap();
        assert!(prompt.contains("**Description:** No description\n"));
        assert!(prompt.contains("```\n+a\n```"));
    }

    #[test]
    fn test_daily_standup_metrics() {
        let metrics = json!({"open_issues": 4, "closed_issues": 2, "open_prs": 1, "merged_prs": 3});
        let prompt = prompts()
            .daily_standup(&metrics, "Issue #1: Login (open)")
            .unwrap();
        assert!(prompt.contains("- Open Issues: 4\n- Completed Issues: 2\n- Active PRs: 1\n- Merged PRs: 3"));
        assert!(prompt.contains("**Recent Activity:**\nIssue #1: Login (open)\n"));
    }

    #[test]
    fn test_diff_with_angle_brackets_is_verbatim() {
        let prompt = prompts()
            .pr_review("Fix", Some("desc"), "-if a < b:\n+if a <= b:", 3000)
            .unwrap();
        assert!(prompt.contains("-if a < b:\n+if a <= b:"));
    }
}
