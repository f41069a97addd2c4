// PM standup agent: daily report from the last day of repository activity

use super::sprint_plan::recorded_page_id;
use super::{log_summary, AgentEnv};
use crate::confluence::ConfluenceClient;
use crate::github::{GitHubClient, Issue, PullRequest};
use crate::slack::blocks;
use crate::utils::{date_label, timestamp_label, truncate_chars};
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Items of each kind quoted in the prompt
const PROMPT_ITEMS: usize = 5;
const ACTIVITY_WINDOW_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StandupMetrics {
    pub open_issues: usize,
    pub closed_issues: usize,
    pub open_prs: usize,
    pub merged_prs: usize,
}

impl StandupMetrics {
    /// PRs that are neither open nor merged are not counted
    pub fn from_activity(issues: &[Issue], prs: &[PullRequest]) -> Self {
        let mut metrics = Self::default();
        for issue in issues {
            if issue.state == "open" {
                metrics.open_issues += 1;
            } else {
                metrics.closed_issues += 1;
            }
        }
        for pr in prs {
            if pr.state == "open" {
                metrics.open_prs += 1;
            } else if pr.merged_at.is_some() {
                metrics.merged_prs += 1;
            }
        }
        metrics
    }
}

pub fn activity_text(issues: &[Issue], prs: &[PullRequest]) -> String {
    let items: Vec<String> = issues
        .iter()
        .take(PROMPT_ITEMS)
        .map(|i| format!("Issue #{}: {} ({})", i.number, i.title, i.state))
        .chain(
            prs.iter()
                .take(PROMPT_ITEMS)
                .map(|p| format!("PR #{}: {} ({})", p.number, p.title, p.state)),
        )
        .collect();

    if items.is_empty() {
        "No recent activity".to_string()
    } else {
        items.join("\n")
    }
}

/// Markdown section appended to the sprint page or published on its own
pub fn standup_content(report: &str, metrics: &StandupMetrics, now: DateTime<Utc>) -> String {
    format!(
        "\n\n## Daily Standup - {date}\n\n{report}\n\n\
**Metrics:**\n\
- Open Issues: {open_issues}\n\
- Closed Issues (24h): {closed_issues}\n\
- Open PRs: {open_prs}\n\
- Merged PRs (24h): {merged_prs}\n\n\
---\n\
*Generated at {timestamp}*\n",
        date = date_label(now),
        report = report,
        open_issues = metrics.open_issues,
        closed_issues = metrics.closed_issues,
        open_prs = metrics.open_prs,
        merged_prs = metrics.merged_prs,
        timestamp = timestamp_label(now),
    )
}

/// Activity lists are best effort: a failed listing counts as no activity
async fn recent_activity(
    github: &GitHubClient,
    since: DateTime<Utc>,
    max_items: usize,
) -> (Vec<Issue>, Vec<PullRequest>) {
    let since = since.to_rfc3339();
    let mut issues = match github.list_issues("all", Some(&since)).await {
        Ok(issues) => issues,
        Err(e) => {
            log::warn!("Could not list issues: {}", e);
            Vec::new()
        }
    };
    let mut prs = match github.list_pull_requests("all").await {
        Ok(prs) => prs,
        Err(e) => {
            log::warn!("Could not list pull requests: {}", e);
            Vec::new()
        }
    };
    issues.truncate(max_items);
    prs.truncate(max_items);
    (issues, prs)
}

pub fn standalone_title(date: &str) -> String {
    format!("Daily Standup - {}", date)
}

/// A rerun on the same day appends to that day's page; titles are unique per space
async fn publish_standalone(confluence: &ConfluenceClient, title: &str, content: &str) -> Result<()> {
    if let Some(page) = confluence.get_page_by_title(title).await? {
        if confluence.append_to_page(&page.id, content).await? {
            log::info!("Added standup to existing page: {}", page.url);
            return Ok(());
        }
    }

    let page = confluence.create_page(title, content, None).await?;
    log::info!("Created standalone standup page: {}", page.url);
    Ok(())
}

pub async fn run(env: &AgentEnv) -> Result<i32> {
    log::info!("PM standup agent starting");

    let github = env.github()?;
    let confluence = env.confluence()?;
    let slack = env.slack()?;
    let mut claude = env.claude()?;
    let mut prompts = env.prompts();

    let now = Utc::now();
    log::info!("Collecting team activity");
    let (issues, prs) = recent_activity(
        &github,
        now - Duration::hours(ACTIVITY_WINDOW_HOURS),
        env.settings.limits.activity_items,
    )
    .await;
    let metrics = StandupMetrics::from_activity(&issues, &prs);
    log::info!(
        "Open issues: {}, merged PRs: {}",
        metrics.open_issues,
        metrics.merged_prs
    );

    log::info!("Generating standup report");
    let prompt = prompts.daily_standup(&metrics, &activity_text(&issues, &prs))?;
    let generation = claude
        .generate(&prompt, env.settings.llm.standup_max_tokens, None)
        .await?;
    let report = generation.content;
    log::info!("Report generated ({} tokens)", generation.tokens_used);

    let content = standup_content(&report, &metrics, now);
    let today = date_label(now);

    let appended = match recorded_page_id(&env.workdir) {
        Some(page_id) => {
            let appended = confluence.append_to_page(&page_id, &content).await?;
            if appended {
                log::info!("Added standup to sprint planning page {}", page_id);
            }
            appended
        }
        None => {
            log::warn!("No sprint planning page found, will create standalone page");
            false
        }
    };
    if !appended {
        publish_standalone(&confluence, &standalone_title(&today), &content).await?;
    }

    slack
        .send_message(
            &format!("📊 Daily Standup - {}", today),
            Some(blocks::standup(
                &today,
                metrics.open_issues,
                metrics.closed_issues,
                metrics.open_prs,
                metrics.merged_prs,
                truncate_chars(&report, env.settings.limits.chat_summary_chars),
            )),
        )
        .await;

    log_summary(
        "PM standup agent completed",
        &[
            format!(
                "Metrics: {} open / {} closed issues, {} open / {} merged PRs",
                metrics.open_issues, metrics.closed_issues, metrics.open_prs, metrics.merged_prs
            ),
            format!("Cost: ${}", claude.cost()),
        ],
    );

    Ok(0)
}
