// PR review agent: model-written review posted on the pull request

use super::{log_summary, AgentEnv};
use crate::github::PullRequestFile;
use anyhow::Result;

/// Unified diff of the files GitHub returned patches for
///
/// Binary and very large files come without a patch and are skipped.
pub fn combined_diff(files: &[PullRequestFile]) -> String {
    files
        .iter()
        .filter_map(|f| {
            f.patch
                .as_deref()
                .map(|patch| format!("--- a/{0}\n+++ b/{0}\n{1}", f.filename, patch))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn review_comment(review: &str, files_reviewed: usize, cost: f64) -> String {
    format!(
        "## 🔍 PR Review Agent\n\n\
**Files Reviewed:** {}\n\n\
{}\n\n\
---\n\
*Generated by PR Review Agent | Cost: ${}*",
        files_reviewed,
        review.trim(),
        cost
    )
}

pub async fn run(env: &AgentEnv, pr_number: u32) -> Result<i32> {
    log::info!("PR review agent starting for PR #{}", pr_number);

    let github = env.github()?;
    let mut claude = env.claude()?;
    let mut prompts = env.prompts();

    let pr = github.get_pull_request(pr_number).await?;
    log::info!("PR: {}", pr.title);

    let files = github.list_pull_request_files(pr_number).await?;
    let diff = combined_diff(&files);
    if diff.is_empty() {
        log::info!("No reviewable changes in PR #{}", pr_number);
        return Ok(0);
    }
    let reviewed = files.iter().filter(|f| f.patch.is_some()).count();

    log::info!("Generating review for {} file(s)", reviewed);
    let prompt = prompts.pr_review(
        &pr.title,
        pr.body.as_deref(),
        &diff,
        env.settings.limits.review_diff_chars,
    )?;
    let review = claude
        .generate(&prompt, env.settings.llm.review_max_tokens, None)
        .await?;

    let comment = review_comment(&review.content, reviewed, claude.cost());
    let posted = match github.post_issue_comment(pr_number, &comment).await {
        Ok(comment) => {
            log::info!("Review posted: {}", comment.html_url);
            true
        }
        Err(e) => {
            log::warn!("Could not post review: {}", e);
            false
        }
    };

    log_summary(
        "PR review agent completed",
        &[
            format!("Files reviewed: {}", reviewed),
            format!("Review comment: {}", if posted { "posted" } else { "skipped" }),
            format!("Cost: ${}", claude.cost()),
        ],
    );

    Ok(0)
}
