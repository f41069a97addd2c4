use clap::{Parser, Subcommand};
use sdlc_agents_lib::agents::{self, deploy::DeployOrigin, AgentEnv};
use sdlc_agents_lib::config;
use std::path::PathBuf;

/// SDLC agents - CI automations backed by Claude, GitHub, Jira, Confluence and Slack
#[derive(Parser, Debug)]
#[command(name = "sdlc-agents")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file, applied over the global and project settings
    #[arg(long, global = true, env = "SDLC_AGENTS_CONFIG")]
    config: Option<PathBuf>,

    /// Checkout the agent works in
    #[arg(long, global = true, default_value = ".")]
    workdir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate and run unit tests for the last commit
    UnitTest {
        /// Commit to comment on when HEAD cannot be read
        #[arg(long, env = "GITHUB_SHA")]
        sha: Option<String>,
    },

    /// Generate and run automation tests for a pull request
    Qa {
        #[arg(long, env = "PR_NUMBER")]
        pr_number: u32,
    },

    /// Publish the daily standup report
    PmStandup,

    /// Deploy the checkout to local staging
    Deploy {
        #[arg(long, env = "GITHUB_REPOSITORY")]
        repository: Option<String>,

        #[arg(long, env = "GITHUB_REF_NAME")]
        branch: Option<String>,
    },

    /// Turn an issue into a Jira feature, BA analysis and sprint plan
    Requirements {
        #[arg(long, env = "ISSUE_NUMBER")]
        issue_number: u32,
    },

    /// Post a code review on a pull request
    PrReview {
        #[arg(long, env = "PR_NUMBER")]
        pr_number: u32,
    },
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let settings = config::load_settings(&cli.workdir, cli.config)?;
    let env = AgentEnv::new(settings, cli.workdir);

    match cli.command {
        Command::UnitTest { sha } => agents::unit_test::run(&env, sha).await,
        Command::Qa { pr_number } => agents::qa::run(&env, pr_number).await,
        Command::PmStandup => agents::pm_standup::run(&env).await,
        Command::Deploy { repository, branch } => {
            agents::deploy::run(&env, DeployOrigin::new(repository, branch)).await
        }
        Command::Requirements { issue_number } => {
            agents::requirements::run(&env, issue_number).await
        }
        Command::PrReview { pr_number } => agents::pr_review::run(&env, pr_number).await,
    }
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    let code = rt.block_on(async {
        match run(cli).await {
            Ok(code) => code,
            Err(e) => {
                log::error!("Agent failed: {:#}", e);
                1
            }
        }
    });

    std::process::exit(code);
}
