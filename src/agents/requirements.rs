// Requirements agent: GitHub issue to Jira feature, BA analysis, stories
// and a sprint plan

use super::sprint_plan::{write_record, SprintPlanRecord};
use super::{log_summary, AgentEnv};
use crate::confluence::Page;
use crate::jira::CreatedIssue;
use crate::parsers::{parse_user_stories, UserStory};
use crate::utils::bullet_list;
use anyhow::Result;
use chrono::Utc;

/// A story that made it into Jira
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedStory {
    pub key: String,
    pub title: String,
}

impl CreatedStory {
    pub fn label(&self) -> String {
        format!("{}: {}", self.key, self.title)
    }
}

pub fn ba_page_title(feature_key: &str, title: &str) -> String {
    format!("BA Analysis: {} - {}", feature_key, title)
}

pub fn sprint_page_title(feature_key: &str, title: &str) -> String {
    format!("Sprint Plan: {} - {}", feature_key, title)
}

pub fn issue_comment(
    feature_key: &str,
    feature_url: &str,
    ba_page: &Page,
    sprint_page: &Page,
    stories: &[CreatedStory],
    cost: f64,
) -> String {
    let stories = if stories.is_empty() {
        "_No user stories were created._".to_string()
    } else {
        bullet_list(&stories.iter().map(CreatedStory::label).collect::<Vec<_>>())
    };
    format!(
        "## 📋 Requirements Agent\n\n\
**Jira Feature:** [{key}]({feature_url})\n\
**BA Analysis:** {ba_url}\n\
**Sprint Plan:** {sprint_url}\n\n\
**User Stories:**\n\
{stories}\n\n\
---\n\
*Generated by Requirements Agent | Cost: ${cost}*",
        key = feature_key,
        feature_url = feature_url,
        ba_url = ba_page.url,
        sprint_url = sprint_page.url,
        stories = stories,
        cost = cost,
    )
}

pub fn feature_comment(ba_page: &Page, sprint_page: &Page, story_count: usize) -> String {
    format!(
        "BA analysis published: {}\nSprint plan published: {}\nUser stories created: {}",
        ba_page.url, sprint_page.url, story_count
    )
}

/// Unparseable story output leaves the feature without stories
fn stories_from_reply(reply: &str) -> Vec<UserStory> {
    match parse_user_stories(reply) {
        Ok(stories) => stories,
        Err(e) => {
            log::warn!("Could not parse user stories: {:#}", e);
            Vec::new()
        }
    }
}

pub async fn run(env: &AgentEnv, issue_number: u32) -> Result<i32> {
    log::info!("Requirements agent starting for issue #{}", issue_number);

    let github = env.github()?;
    let jira = env.jira()?;
    let confluence = env.confluence()?;
    let slack = env.slack()?;
    let mut claude = env.claude()?;
    let mut prompts = env.prompts();
    let max_tokens = env.settings.llm.analysis_max_tokens;
    let mut total_tokens = 0;

    log::info!("Fetching issue #{}", issue_number);
    let issue = github.get_issue(issue_number).await?;
    let description = issue.body.clone().unwrap_or_default();
    log::info!("Issue: {}", issue.title);

    let feature: CreatedIssue = jira
        .create_feature(&issue.title, &description, issue_number)
        .await?;
    let feature_url = jira.browse_url(&feature.key);
    slack
        .notify_feature_created(issue_number, &issue.title, &feature.key, &feature_url)
        .await;

    log::info!("Generating BA analysis");
    let prompt = prompts.ba_analysis(&issue.title, &description)?;
    let analysis = claude.generate(&prompt, max_tokens, None).await?;
    total_tokens += analysis.tokens_used;

    let ba_page = confluence
        .create_page(&ba_page_title(&feature.key, &issue.title), &analysis.content, None)
        .await?;

    log::info!("Extracting user stories");
    let prompt = prompts.extract_user_stories(&analysis.content)?;
    let extraction = claude.generate(&prompt, max_tokens, None).await?;
    total_tokens += extraction.tokens_used;

    let mut created = Vec::new();
    for story in stories_from_reply(&extraction.content) {
        match jira
            .create_user_story(&story.title, &story.full_description(), &feature.key)
            .await
        {
            Ok(story_issue) => created.push(CreatedStory {
                key: story_issue.key,
                title: story.title,
            }),
            Err(e) => log::warn!("Could not create story '{}': {}", story.title, e),
        }
    }
    let labels: Vec<String> = created.iter().map(CreatedStory::label).collect();
    log::info!("Created {} user stories", created.len());

    slack
        .notify_ba_complete(issue_number, &feature.key, &ba_page.url, &labels)
        .await;

    log::info!("Generating sprint plan");
    let prompt = prompts.sprint_planning(&issue.title, &labels, env.settings.planning.team_size)?;
    let plan = claude.generate(&prompt, max_tokens, None).await?;
    total_tokens += plan.tokens_used;

    let sprint_page = confluence
        .create_page(
            &sprint_page_title(&feature.key, &issue.title),
            &plan.content,
            Some(&ba_page.id),
        )
        .await?;

    write_record(
        &env.workdir,
        &SprintPlanRecord {
            page_id: Some(sprint_page.id.clone()),
            page_url: Some(sprint_page.url.clone()),
            feature_key: Some(feature.key.clone()),
            issue_number: Some(issue_number),
            stories: created.iter().map(|s| s.key.clone()).collect(),
            created_at: Some(Utc::now().to_rfc3339()),
        },
    )?;

    let comment = issue_comment(
        &feature.key,
        &feature_url,
        &ba_page,
        &sprint_page,
        &created,
        claude.cost(),
    );
    if let Err(e) = github.post_issue_comment(issue_number, &comment).await {
        log::warn!("Could not comment on issue #{}: {}", issue_number, e);
    }
    if let Err(e) = jira
        .add_comment(&feature.key, &feature_comment(&ba_page, &sprint_page, created.len()))
        .await
    {
        log::warn!("Could not comment on {}: {}", feature.key, e);
    }

    log_summary(
        "Requirements agent completed",
        &[
            format!("Feature: {}", feature.key),
            format!("User stories: {}", created.len()),
            format!("BA analysis: {}", ba_page.url),
            format!("Sprint plan: {}", sprint_page.url),
            format!("Tokens: {}", total_tokens),
            format!("Cost (last call): ${}", claude.cost()),
        ],
    );

    Ok(0)
}
