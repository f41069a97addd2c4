// Parsers for model replies, test-runner output and free text

pub mod code_fence;
pub mod issue_keys;
pub mod test_output;
pub mod user_stories;

pub use code_fence::extract_code;
pub use issue_keys::{extract_issue_keys, first_issue_key};
pub use test_output::{RunVerdict, TestCounts, TestStatus};
pub use user_stories::{parse_user_stories, UserStory};
