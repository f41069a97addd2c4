// User stories returned by the story-extraction prompt

use anyhow::{anyhow, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStory {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
}

impl UserStory {
    /// Description followed by the acceptance criteria, one per line
    pub fn full_description(&self) -> String {
        if self.acceptance_criteria.is_empty() {
            return self.description.clone();
        }
        let criteria = self
            .acceptance_criteria
            .iter()
            .map(|c| format!("- {}", c))
            .collect::<Vec<_>>()
            .join("\n");
        format!("{}\n\nAcceptance Criteria:\n{}", self.description, criteria)
    }
}

static JSON_BLOCK_PATTERN: OnceLock<Regex> = OnceLock::new();

fn get_json_block_pattern() -> &'static Regex {
    JSON_BLOCK_PATTERN.get_or_init(|| Regex::new(r"```(?:json)?\s*\n([\s\S]*?)```").unwrap())
}

/// Extract fenced code blocks (```` ```json ```` or bare) from markdown content
pub fn extract_json_blocks(content: &str) -> Vec<String> {
    get_json_block_pattern()
        .captures_iter(content)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().trim().to_string()))
        .collect()
}

/// Parse a JSON array of stories from a model reply
///
/// Tries the whole reply, then each fenced block, then the outermost
/// `[ ... ]` span.
pub fn parse_user_stories(reply: &str) -> Result<Vec<UserStory>> {
    let trimmed = reply.trim();
    if let Ok(stories) = serde_json::from_str::<Vec<UserStory>>(trimmed) {
        return Ok(stories);
    }

    for block in extract_json_blocks(reply) {
        if let Ok(stories) = serde_json::from_str::<Vec<UserStory>>(&block) {
            return Ok(stories);
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('['), trimmed.rfind(']')) {
        if start < end {
            if let Ok(stories) = serde_json::from_str::<Vec<UserStory>>(&trimmed[start..=end]) {
                return Ok(stories);
            }
        }
    }

    Err(anyhow!("Reply does not contain a JSON array of user stories"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORIES: &str = r#"[
  {
    "title": "Filter by price",
    "description": "As a shopper, I want to filter by price, so that I stay on budget",
    "acceptance_criteria": ["Given a range When I apply it Then only matching items show"]
  },
  {"title": "Clear filters"}
]"#;

    #[test]
    fn test_plain_json_array() {
        let stories = parse_user_stories(STORIES).unwrap();
        assert_eq!(stories.len(), 2);
        assert_eq!(stories[0].title, "Filter by price");
        assert!(stories[1].acceptance_criteria.is_empty());
    }

    #[test]
    fn test_fenced_json_array() {
        let reply = format!("Here are the stories:\n\n```json\n{}\n```\n", STORIES);
        assert_eq!(parse_user_stories(&reply).unwrap().len(), 2);
    }

    #[test]
    fn test_array_inside_prose() {
        let reply = format!("Sure! {} Let me know.", STORIES);
        assert_eq!(parse_user_stories(&reply).unwrap().len(), 2);
    }

    #[test]
    fn test_no_array() {
        assert!(parse_user_stories("I could not find any stories.").is_err());
    }

    #[test]
    fn test_extract_json_blocks_empty() {
        assert!(extract_json_blocks("No JSON blocks here, just text.").is_empty());
    }

    #[test]
    fn test_full_description_lists_criteria() {
        let story = UserStory {
            title: "t".to_string(),
            description: "As a user".to_string(),
            acceptance_criteria: vec!["Given A".to_string(), "Given B".to_string()],
        };
        assert_eq!(
            story.full_description(),
            "As a user\n\nAcceptance Criteria:\n- Given A\n- Given B"
        );
    }
}
