// Deploy agent: local staging deployment
//
// Every step is allowed to fail; only failing to run commands at all, or to
// write the summary, fails the deployment.

use super::{log_summary, AgentEnv};
use crate::runner::{self, CommandOutcome};
use crate::utils::timestamp_label;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::time::Instant;

pub const SUMMARY_FILE: &str = "deployment_summary.md";

/// One shell command of the deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployStep {
    pub description: String,
    pub command: String,
}

impl DeployStep {
    fn new(description: &str, command: impl Into<String>) -> Self {
        Self {
            description: description.to_string(),
            command: command.into(),
        }
    }
}

/// Where the deployment came from, for the summary
#[derive(Debug, Clone)]
pub struct DeployOrigin {
    pub repository: String,
    pub branch: String,
}

impl DeployOrigin {
    pub fn new(repository: Option<String>, branch: Option<String>) -> Self {
        Self {
            repository: repository.unwrap_or_else(|| "local".to_string()),
            branch: branch.unwrap_or_else(|| "main".to_string()),
        }
    }
}

/// Steps for the checkout, chosen by which project files exist
pub fn plan_steps(exists: impl Fn(&str) -> bool, test_command: &str) -> Vec<DeployStep> {
    let mut steps = vec![DeployStep::new("Checking git status", "git status")];

    if exists("requirements.txt") {
        steps.push(DeployStep::new(
            "Installing Python packages",
            "pip install -r requirements.txt --quiet",
        ));
    } else {
        log::info!("No requirements.txt found");
    }

    if exists("manage.py") {
        steps.push(DeployStep::new("Running Django migrations", "python manage.py migrate"));
    } else if exists("alembic.ini") {
        steps.push(DeployStep::new("Running Alembic migrations", "alembic upgrade head"));
    } else {
        log::info!("No migrations to run");
    }

    if exists("package.json") {
        steps.push(DeployStep::new("Installing npm packages", "npm install --silent"));
        steps.push(DeployStep::new("Building frontend", "npm run build"));
    } else {
        log::info!("No frontend build needed");
    }

    steps.push(DeployStep::new(
        "Running test suite",
        format!("{} tests/ -v", test_command),
    ));
    steps
}

fn outcome_line(outcome: &CommandOutcome) -> String {
    let mark = if outcome.success { "✅" } else { "❌" };
    let detail = if outcome.timed_out {
        " (timed out)".to_string()
    } else if outcome.success {
        String::new()
    } else {
        format!(" (exit code {})", outcome.exit_code)
    };
    format!("{} {}{}", mark, outcome.description, detail)
}

pub fn summary_markdown(
    environment: &str,
    origin: &DeployOrigin,
    outcomes: &[CommandOutcome],
    duration_secs: f64,
    finished_at: DateTime<Utc>,
) -> String {
    let steps = outcomes
        .iter()
        .map(outcome_line)
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "\n# Deployment Summary\n\n\
**Environment:** {environment}\n\
**Time:** {time}\n\
**Duration:** {duration:.2}s\n\
**Repository:** {repository}\n\
**Branch:** {branch}\n\n\
## Steps Completed\n\n\
{steps}\n\n\
## Manual Testing\n\n\
Application is now running locally and ready for manual testing.\n\n\
**Next Steps:**\n\
1. Perform smoke tests\n\
2. Check critical user flows\n\
3. Verify integrations\n\
4. Test edge cases\n\n\
**Deployment Time:** {duration:.2}s\n",
        environment = environment,
        time = timestamp_label(finished_at),
        duration = duration_secs,
        repository = origin.repository,
        branch = origin.branch,
        steps = steps,
    )
}

fn log_staging_banner(origin: &DeployOrigin, now: DateTime<Utc>) {
    log::info!("{}", "=".repeat(60));
    log::info!("LOCAL STAGING ENVIRONMENT");
    log::info!("Deployed at: {}", now.format("%Y-%m-%d %H:%M:%S"));
    log::info!("Repository: {}", origin.repository);
    log::info!("Branch: {}", origin.branch);
    log::info!("Health Check: PASSED");
    log::info!("Application is ready for manual testing");
    log::info!("{}", "=".repeat(60));
}

async fn deploy(env: &AgentEnv, origin: &DeployOrigin) -> Result<f64> {
    let started = Instant::now();
    let steps = plan_steps(|f| env.exists(f), &env.settings.runner.test_command);

    let mut outcomes = Vec::with_capacity(steps.len());
    for step in &steps {
        let outcome = runner::run_command(
            &step.description,
            &step.command,
            env.settings.runner.deploy_step_timeout_secs,
            Some(&env.workdir),
        )
        .await?;
        if !outcome.success {
            log::warn!("{} failed, continuing", step.description);
        }
        outcomes.push(outcome);
    }

    let now = Utc::now();
    log_staging_banner(origin, now);

    let duration = started.elapsed().as_secs_f64();
    let summary = summary_markdown(&env.settings.deploy.environment, origin, &outcomes, duration, now);
    env.write_file(SUMMARY_FILE, &summary)?;
    log::info!("Deployment summary saved to {}", SUMMARY_FILE);

    Ok(duration)
}

pub async fn run(env: &AgentEnv, origin: DeployOrigin) -> Result<i32> {
    log::info!("Deploy agent starting");

    let slack = env.slack()?;
    let environment = &env.settings.deploy.environment;
    let app_url = env.settings.deploy.app_url.as_deref();

    match deploy(env, &origin).await {
        Ok(duration) => {
            slack.notify_deployment(environment, true, app_url).await;
            log_summary(
                "Deploy agent completed",
                &[
                    format!("Environment: {}", environment),
                    format!("Deployment time: {:.2}s", duration),
                    format!("URL: {}", app_url.unwrap_or("n/a")),
                ],
            );
            Ok(0)
        }
        Err(e) => {
            log::error!("Deploy agent failed: {:#}", e);
            slack.notify_deployment(environment, false, None).await;
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn outcome(description: &str, success: bool, exit_code: i32, timed_out: bool) -> CommandOutcome {
        CommandOutcome {
            description: description.to_string(),
            success,
            exit_code,
            stdout: String::new(),
            stderr: String::new(),
            timed_out,
        }
    }

    fn commands(steps: &[DeployStep]) -> Vec<&str> {
        steps.iter().map(|s| s.command.as_str()).collect()
    }

    #[test]
    fn test_bare_checkout_steps() {
        let steps = plan_steps(|_| false, "pytest");
        assert_eq!(commands(&steps), vec!["git status", "pytest tests/ -v"]);
    }

    #[test]
    fn test_full_project_steps() {
        let steps = plan_steps(|_| true, "python -m pytest");
        assert_eq!(
            commands(&steps),
            vec![
                "git status",
                "pip install -r requirements.txt --quiet",
                "python manage.py migrate",
                "npm install --silent",
                "npm run build",
                "python -m pytest tests/ -v",
            ]
        );
    }

    #[test]
    fn test_alembic_only_without_django() {
        let steps = plan_steps(|f| f == "alembic.ini", "pytest");
        assert!(commands(&steps).contains(&"alembic upgrade head"));
        assert!(!commands(&steps).contains(&"python manage.py migrate"));
    }

    #[test]
    fn test_origin_defaults() {
        let origin = DeployOrigin::new(None, None);
        assert_eq!(origin.repository, "local");
        assert_eq!(origin.branch, "main");
    }

    #[test]
    fn test_summary_lists_real_outcomes() {
        let origin = DeployOrigin::new(Some("acme/shop".to_string()), Some("release".to_string()));
        let outcomes = vec![
            outcome("Checking git status", true, 0, false),
            outcome("Installing Python packages", false, 2, false),
            outcome("Running test suite", false, 1, true),
        ];
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let summary = summary_markdown("Local Staging", &origin, &outcomes, 12.345, at);

        assert!(summary.starts_with("\n# Deployment Summary\n\n**Environment:** Local Staging\n"));
        assert!(summary.contains("**Time:** 2024-05-01 12:00 UTC\n**Duration:** 12.35s\n"));
        assert!(summary.contains("**Repository:** acme/shop\n**Branch:** release\n"));
        assert!(summary.contains(
            "✅ Checking git status\n❌ Installing Python packages (exit code 2)\n❌ Running test suite (timed out)\n"
        ));
        assert!(summary.ends_with("**Deployment Time:** 12.35s\n"));
    }
}
