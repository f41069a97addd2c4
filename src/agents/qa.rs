// QA agent: automation tests for a pull request's Python changes

use super::{generated_test_module, is_python_source, log_summary, AgentEnv};
use crate::github::PullRequest;
use crate::parsers::{extract_code, first_issue_key, TestCounts, TestStatus};
use crate::runner;
use crate::utils::truncate_chars;
use anyhow::Result;
use std::path::Path;

pub const QA_TEST_FILE: &str = "tests/test_qa_automation.py";

pub fn results_comment(counts: &TestCounts, output: &str, max_output_chars: usize) -> String {
    let status = TestStatus::from_counts(counts);
    format!(
        "## 🧪 QA Agent - Automation Test Results\n\n\
**Status:** {emoji} {text}\n\n\
### Test Summary\n\
- **Total Tests:** {total}\n\
- **Passed:** ✅ {passed}\n\
- **Failed:** ❌ {failed}\n\
- **Errors:** 🔴 {errors}\n\
- **Success Rate:** {rate:.1}%\n\n\
<details>\n\
<summary>📋 Detailed Test Output</summary>\n\n\
```\n\
{output}\n\
```\n\
</details>\n\n\
---\n\
*Generated by QA Agent*",
        emoji = status.emoji(),
        text = status.text(),
        total = counts.total(),
        passed = counts.passed,
        failed = counts.failed,
        errors = counts.errors,
        rate = counts.success_rate(),
        output = truncate_chars(output, max_output_chars),
    )
}

pub fn jira_comment(counts: &TestCounts, pr_url: &str) -> String {
    format!(
        "QA automation tests completed:\n- Passed: {}\n- Failed: {}\n- Success Rate: {:.1}%\n\nView PR: {}",
        counts.passed,
        counts.failed,
        counts.success_rate(),
        pr_url
    )
}

/// Issue key referenced in the PR description, if any
pub fn linked_issue_key(pr: &PullRequest) -> Option<String> {
    pr.body.as_deref().and_then(first_issue_key)
}

pub async fn run(env: &AgentEnv, pr_number: u32) -> Result<i32> {
    log::info!("QA agent starting for PR #{}", pr_number);

    let github = env.github()?;
    let slack = env.slack()?;
    let mut claude = env.claude()?;
    let mut prompts = env.prompts();
    let limits = &env.settings.limits;

    log::info!("Fetching PR #{}", pr_number);
    let pr = github.get_pull_request(pr_number).await?;
    log::info!("PR: {}", pr.title);

    let changed: Vec<String> = github
        .list_pull_request_files(pr_number)
        .await?
        .into_iter()
        .map(|f| f.filename)
        .filter(|name| is_python_source(name))
        .collect();
    log::info!("Found {} Python files", changed.len());

    if changed.is_empty() {
        log::info!("No Python files to test");
        return Ok(0);
    }

    log::info!("Generating automation tests");
    let prompt = prompts.qa_automation_tests(&pr.title, &changed, limits.qa_prompt_files)?;
    let generation = claude
        .generate(&prompt, env.settings.llm.qa_max_tokens, None)
        .await?;
    let code = extract_code(&generation.content);
    log::info!("Generated {} chars of test code", code.len());

    let test_path = env.write_file(QA_TEST_FILE, &generated_test_module(&[code]))?;
    log::info!("Tests saved to {}", test_path.display());

    let report = runner::run_tests(
        &env.settings.runner.test_command,
        Path::new(QA_TEST_FILE),
        env.settings.runner.qa_test_timeout_secs,
        Some(&env.workdir),
    )
    .await?;
    log::info!("Test output:\n{}", report.output);

    let counts = report.counts();
    let status = TestStatus::from_counts(&counts);

    let comment = results_comment(&counts, &report.output, limits.pr_comment_output_chars);
    match github.post_issue_comment(pr_number, &comment).await {
        Ok(_) => log::info!("Posted to GitHub"),
        Err(e) => log::warn!("Could not post PR comment: {}", e),
    }

    if let Some(key) = linked_issue_key(&pr) {
        match env.optional_jira() {
            Some(jira) => match jira.add_comment(&key, &jira_comment(&counts, &pr.html_url)).await {
                Ok(()) => log::info!("Updated Jira {}", key),
                Err(e) => log::warn!("Could not update Jira: {}", e),
            },
            None => log::warn!("Skipping Jira update for {}", key),
        }
    }

    slack
        .notify_tests_complete(pr_number, counts.passed, counts.unsuccessful(), &pr.html_url)
        .await;

    log_summary(
        &format!("{} QA agent completed", status.emoji()),
        &[
            format!("Tests: {}/{} passed", counts.passed, counts.total()),
            format!("Success Rate: {:.1}%", counts.success_rate()),
            format!("Cost: ${}", claude.cost()),
        ],
    );

    Ok(0)
}
