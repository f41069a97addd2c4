// Jira issue keys mentioned in free text (PR bodies, commit messages)

use regex::Regex;
use std::sync::OnceLock;

static ISSUE_KEY_PATTERN: OnceLock<Regex> = OnceLock::new();

fn get_issue_key_pattern() -> &'static Regex {
    ISSUE_KEY_PATTERN.get_or_init(|| Regex::new(r"[A-Z]+-\d+").unwrap())
}

/// All `PROJ-123` style keys in order of appearance
pub fn extract_issue_keys(text: &str) -> Vec<String> {
    get_issue_key_pattern()
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

pub fn first_issue_key(text: &str) -> Option<String> {
    get_issue_key_pattern()
        .find(text)
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_in_order() {
        let body = "Implements SHOP-12 and fixes CART-3.\nSee also SHOP-12.";
        assert_eq!(extract_issue_keys(body), vec!["SHOP-12", "CART-3", "SHOP-12"]);
        assert_eq!(first_issue_key(body).as_deref(), Some("SHOP-12"));
    }

    #[test]
    fn test_lowercase_is_not_a_key() {
        assert!(extract_issue_keys("shop-12 and Shop-3").is_empty());
        assert_eq!(first_issue_key(""), None);
    }

    #[test]
    fn test_key_inside_word() {
        // Uppercase run directly before the digits is enough
        assert_eq!(extract_issue_keys("feature/ABC-42-search"), vec!["ABC-42"]);
    }
}
