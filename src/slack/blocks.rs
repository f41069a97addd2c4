//! Block Kit layouts for agent notifications

use serde_json::{json, Value};

/// Stories listed in a BA notification before the rest are summarised
pub const MAX_LISTED_STORIES: usize = 5;

/// Grade of a finished test run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunGrade {
    AllPassed,
    SomeFailures,
    ManyFailures,
}

impl RunGrade {
    pub fn from_rate(success_rate: f64) -> Self {
        if success_rate >= 100.0 {
            RunGrade::AllPassed
        } else if success_rate >= 80.0 {
            RunGrade::SomeFailures
        } else {
            RunGrade::ManyFailures
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RunGrade::AllPassed => "✅ All Passed",
            RunGrade::SomeFailures => "⚠️ Some Failures",
            RunGrade::ManyFailures => "❌ Many Failures",
        }
    }
}

/// Percentage of passed tests; zero when nothing ran
pub fn success_rate(passed: usize, failed: usize) -> f64 {
    let total = passed + failed;
    if total == 0 {
        0.0
    } else {
        passed as f64 / total as f64 * 100.0
    }
}

fn header(text: &str) -> Value {
    json!({
        "type": "header",
        "text": {"type": "plain_text", "text": text},
    })
}

fn section_text(text: &str) -> Value {
    json!({
        "type": "section",
        "text": {"type": "mrkdwn", "text": text},
    })
}

fn section_fields(fields: &[String]) -> Value {
    let fields: Vec<Value> = fields
        .iter()
        .map(|f| json!({"type": "mrkdwn", "text": f}))
        .collect();
    json!({"type": "section", "fields": fields})
}

fn button(text: &str, url: &str, primary: bool) -> Value {
    let mut button = json!({
        "type": "button",
        "text": {"type": "plain_text", "text": text},
        "url": url,
    });
    if primary {
        button["style"] = json!("primary");
    }
    button
}

fn actions(elements: Vec<Value>) -> Value {
    json!({"type": "actions", "elements": elements})
}

pub fn feature_created(
    issue_number: u32,
    title: &str,
    jira_key: &str,
    jira_url: &str,
    timestamp: &str,
) -> Vec<Value> {
    vec![
        header("🎯 New Feature Created"),
        section_fields(&[
            format!("*Feature:*\n{}", title),
            format!("*Jira Key:*\n<{}|{}>", jira_url, jira_key),
            format!("*GitHub Issue:*\n#{}", issue_number),
        ]),
        json!({
            "type": "context",
            "elements": [{"type": "mrkdwn", "text": format!("⏰ {}", timestamp)}],
        }),
    ]
}

/// Bulleted list of the first stories, with a count of the remainder
pub fn story_list(user_stories: &[String]) -> String {
    let mut list = user_stories
        .iter()
        .take(MAX_LISTED_STORIES)
        .map(|s| format!("• {}", s))
        .collect::<Vec<_>>()
        .join("\n");
    if user_stories.len() > MAX_LISTED_STORIES {
        list.push_str(&format!(
            "\n• ... and {} more",
            user_stories.len() - MAX_LISTED_STORIES
        ));
    }
    list
}

pub fn ba_complete(
    issue_number: u32,
    jira_key: &str,
    confluence_url: &str,
    user_stories: &[String],
) -> Vec<Value> {
    vec![
        header("📋 BA Analysis Complete"),
        section_text(&format!(
            "*Jira:* {}\n*GitHub Issue:* #{}",
            jira_key, issue_number
        )),
        section_text(&format!("*User Stories Created:*\n{}", story_list(user_stories))),
        actions(vec![button("View Confluence Doc", confluence_url, true)]),
    ]
}

pub fn tests_complete(pr_number: u32, passed: usize, failed: usize, pr_url: &str) -> Vec<Value> {
    let rate = success_rate(passed, failed);
    let grade = RunGrade::from_rate(rate);

    vec![
        header(&format!("🧪 Tests Complete: PR #{}", pr_number)),
        section_text(&format!(
            "*Status:* {}\n*Success Rate:* {:.1}%",
            grade.label(),
            rate
        )),
        section_fields(&[
            format!("*Passed:*\n✅ {}", passed),
            format!("*Failed:*\n❌ {}", failed),
        ]),
        actions(vec![button("View PR", pr_url, false)]),
    ]
}

pub fn deployment(environment: &str, success: bool, url: Option<&str>) -> Vec<Value> {
    let (emoji, status) = deployment_status(success);

    let mut blocks = vec![
        header(&format!("{} Deployment {}", emoji, status)),
        section_fields(&[
            format!("*Environment:*\n{}", environment),
            format!("*Status:*\n{}", status),
        ]),
    ];
    if let Some(url) = url {
        blocks.push(actions(vec![button("View Application", url, false)]));
    }
    blocks
}

/// Unit test run on a commit, with a code-formatted output excerpt
pub fn unit_tests_complete(files_tested: usize, status_text: &str, output_excerpt: &str) -> Vec<Value> {
    vec![
        header(&format!("🧪 Unit Tests {}", status_text)),
        section_fields(&[
            format!("*Files Tested:*\n{}", files_tested),
            format!("*Status:*\n{}", status_text),
        ]),
        section_text(&format!("```{}```", output_excerpt)),
    ]
}

/// Headline counts plus the start of the generated report
pub fn standup(
    date: &str,
    open_issues: usize,
    closed_issues: usize,
    open_prs: usize,
    merged_prs: usize,
    summary_excerpt: &str,
) -> Vec<Value> {
    vec![
        header(&format!("📊 Daily Standup - {}", date)),
        section_fields(&[
            format!("*Open Issues:*\n{}", open_issues),
            format!("*Merged PRs:*\n{}", merged_prs),
            format!("*Open PRs:*\n{}", open_prs),
            format!("*Closed Issues:*\n{}", closed_issues),
        ]),
        section_text(&format!("*Summary:*\n{}...", summary_excerpt)),
    ]
}

pub fn deployment_status(success: bool) -> (&'static str, &'static str) {
    if success {
        ("🚀", "Successful")
    } else {
        ("❌", "Failed")
    }
}
