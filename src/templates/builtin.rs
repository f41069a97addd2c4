// Built-in prompt templates

use std::collections::HashMap;

/// Built-in template names
pub const BA_ANALYSIS: &str = "ba_analysis";
pub const EXTRACT_USER_STORIES: &str = "extract_user_stories";
pub const SPRINT_PLANNING: &str = "sprint_planning";
pub const UNIT_TEST_GENERATION: &str = "unit_test_generation";
pub const QA_AUTOMATION_TESTS: &str = "qa_automation_tests";
pub const PR_REVIEW: &str = "pr_review";
pub const DAILY_STANDUP: &str = "daily_standup";

/// Get all built-in templates
pub fn get_builtin_templates() -> HashMap<String, String> {
    list_builtin_templates()
        .into_iter()
        .filter_map(|name| get_builtin_template(name).map(|t| (name.to_string(), t.to_string())))
        .collect()
}

/// Get a specific built-in template
pub fn get_builtin_template(name: &str) -> Option<&'static str> {
    match name {
        BA_ANALYSIS => Some(BA_ANALYSIS_TEMPLATE),
        EXTRACT_USER_STORIES => Some(EXTRACT_USER_STORIES_TEMPLATE),
        SPRINT_PLANNING => Some(SPRINT_PLANNING_TEMPLATE),
        UNIT_TEST_GENERATION => Some(UNIT_TEST_GENERATION_TEMPLATE),
        QA_AUTOMATION_TESTS => Some(QA_AUTOMATION_TESTS_TEMPLATE),
        PR_REVIEW => Some(PR_REVIEW_TEMPLATE),
        DAILY_STANDUP => Some(DAILY_STANDUP_TEMPLATE),
        _ => None,
    }
}

/// List all built-in template names
pub fn list_builtin_templates() -> Vec<&'static str> {
    vec![
        BA_ANALYSIS,
        EXTRACT_USER_STORIES,
        SPRINT_PLANNING,
        UNIT_TEST_GENERATION,
        QA_AUTOMATION_TESTS,
        PR_REVIEW,
        DAILY_STANDUP,
    ]
}

const BA_ANALYSIS_TEMPLATE: &str = r#"You are a Senior Business Analyst. Analyze this requirement and create a comprehensive specification.

**Requirement:**
Title: {{ title }}
Description: {% if description %}{{ description }}{% else %}No description provided{% endif %}

**Create the following sections:**

1. **Overview**
   - Brief summary (2-3 sentences)
   - Business value and impact

2. **User Stories** (Format: As a [user], I want [goal], so that [benefit])
   - Create 3-5 user stories
   - Each story should be independently deliverable

3. **Acceptance Criteria** (Given/When/Then format)
   - For each user story, provide 2-3 acceptance criteria
   - Be specific and testable

4. **Technical Specifications**
   - API endpoints (if applicable)
   - Data models
   - Integration points
   - Technology stack recommendations

5. **Dependencies & Assumptions**
   - What this feature depends on
   - Key assumptions being made

6. **Complexity Estimate**
   - Size: S / M / L / XL
   - Justification for the estimate

Format your response as clear, well-structured markdown."#;

const EXTRACT_USER_STORIES_TEMPLATE: &str = r#"Extract ONLY the user stories from this BA analysis.

{{ ba_analysis }}

Return a JSON array of user stories in this format:
[
  {
    "title": "Short story title (max 60 chars)",
    "description": "As a [user], I want [goal], so that [benefit]",
    "acceptance_criteria": ["Given... When... Then...", "..."]
  }
]

Return ONLY valid JSON, no other text."#;

const SPRINT_PLANNING_TEMPLATE: &str = r#"You are an experienced Scrum Master. Create a Sprint Planning document.

**Feature:** {{ feature_title }}

**User Stories:**
{% for story in stories -%}
- {{ story }}
{% endfor %}
**Team Size:** {{ team_size }} developers

**Create a comprehensive Sprint Planning document with:**

1. **Sprint Goal**
   - Clear, achievable objective
   - Success criteria

2. **Sprint Capacity**
   - Estimated story points
   - Velocity considerations

3. **Story Breakdown & Assignment**
   - Priority order
   - Estimated effort per story
   - Suggested developer assignments

4. **Technical Tasks**
   - Setup/infrastructure needs
   - Testing requirements
   - Code review strategy

5. **Definition of Done**
   - Code complete criteria
   - Testing criteria
   - Documentation criteria

6. **Risks & Mitigation**
   - Potential blockers
   - Mitigation strategies

7. **Daily Standup Schedule**
   - Meeting time
   - Update template

Format as professional markdown suitable for Confluence."#;

const UNIT_TEST_GENERATION_TEMPLATE: &str = r#"You are a Senior QA Engineer. Generate comprehensive unit tests.

**File:** {{ file_path }}

**Code Changes:**
```
{{ code_changes }}
```

**Generate pytest unit tests that:**
1. Test happy path scenarios
2. Test edge cases
3. Test error handling
4. Use clear test names (test_feature_scenario_expected)
5. Include docstrings

Generate 5-10 tests minimum. Return ONLY valid Python code, no explanations."#;

const QA_AUTOMATION_TESTS_TEMPLATE: &str = r#"You are a Senior QA Automation Engineer. Create automated integration tests.

**Pull Request:** {{ pr_title }}

**Changed Files:**
{% for file in changed_files -%}
- {{ file }}
{% endfor %}
**Generate pytest integration tests that:**
1. Test end-to-end workflows
2. Validate API contracts
3. Check error scenarios
4. Verify data integrity
5. Include setup/teardown

Generate 3-5 comprehensive test scenarios. Return ONLY valid Python code."#;

const PR_REVIEW_TEMPLATE: &str = r#"You are a Senior Software Engineer performing a code review.

**Pull Request:** {{ pr_title }}
**Description:** {% if pr_description %}{{ pr_description }}{% else %}No description{% endif %}

**Code Diff:**
```
{{ diff }}
```

**Provide a structured code review:**

1. **Overall Assessment**
   - Approve / Request Changes / Comment
   - High-level summary

2. **Code Quality**
   - Readability
   - Maintainability
   - Best practices adherence

3. **Potential Issues**
   - Bugs or logic errors
   - Security concerns
   - Performance issues
   - Missing error handling

4. **Suggestions**
   - Improvements
   - Optimizations
   - Alternative approaches

5. **Positive Feedback**
   - What was done well
   - Good patterns used

Be constructive and specific. Focus on actionable feedback."#;

const DAILY_STANDUP_TEMPLATE: &str = r#"You are a Program Manager. Create a daily standup report.

**Metrics:**
- Open Issues: {{ metrics.open_issues }}
- Completed Issues: {{ metrics.closed_issues }}
- Active PRs: {{ metrics.open_prs }}
- Merged PRs: {{ metrics.merged_prs }}

**Recent Activity:**
{{ recent_activity }}

**Create a professional standup report with:**

1. **Executive Summary** (2-3 sentences)

2. **Yesterday's Achievements**
   - Completed work
   - Merged features

3. **Today's Focus**
   - Active work items
   - Priorities

4. **Blockers & Risks**
   - Issues blocking progress
   - Mitigation plans

5. **Team Velocity**
   - Progress indicators
   - Health metrics

6. **Next Steps**
   - Upcoming priorities
   - Required actions

Format as clear, executive-ready markdown."#;
