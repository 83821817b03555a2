use anyhow::Context;
use clap::Parser;
use gh_snapshot::cli::Args;
use gh_snapshot::config::AppConfig;
use gh_snapshot::github::GitHubClient;
use gh_snapshot::logging;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    // A missing .env is fine; settings may come straight from the environment.
    let dotenv = dotenvy::dotenv();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    let _guard = logging::init(&config.log_file, config.log_filter()?)
        .context("Failed to initialise logging")?;

    if let Err(e) = dotenv {
        tracing::debug!("No .env file loaded: {}", e);
    }

    let client = GitHubClient::new(config.github_token.clone())?;

    Ok(if gh_snapshot::run(&config, &client, &args).await? {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
