pub mod cli;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod github;
pub mod logging;
pub mod output;
pub mod types;

pub use error::FetchError;

use cli::{Args, Target};
use config::AppConfig;
use github::GitHubClient;

/// Resolves the configured repository and runs the requested fetches.
///
/// Returns `Ok(true)` when every requested fetch wrote its file and
/// `Ok(false)` when at least one failed. Errors before any fetch starts
/// (rejected credential, unknown repository, unwritable `DATA_DIR`) are
/// returned as `Err`, and in that case nothing has been written.
pub async fn run(
    config: &AppConfig,
    client: &GitHubClient,
    args: &Args,
) -> Result<bool, FetchError> {
    let repository = match client.repository(&config.repo_name).await {
        Ok(repository) => repository,
        Err(e) => {
            tracing::error!("Failed to open {}: {}", config.repo_name, e);
            return Err(e);
        }
    };

    tokio::fs::create_dir_all(&config.data_dir)
        .await
        .map_err(|e| FetchError::io(&config.data_dir, e))?;

    let window = config.window();
    tracing::info!(repo_id = %repository.id(), window = %window, "Starting snapshot");

    let issues = async {
        if !args.wants(Target::Issues) {
            return None;
        }
        Some(
            fetcher::fetch_issues(
                &repository,
                &window,
                config.per_page,
                config.max_records(),
                &config.issue_output_path(),
            )
            .await,
        )
    };
    let pulls = async {
        if !args.wants(Target::Pulls) {
            return None;
        }
        Some(
            fetcher::fetch_pull_requests(
                &repository,
                &window,
                config.per_page,
                &config.pr_output_path(),
            )
            .await,
        )
    };

    let (issues, pulls) = futures::join!(issues, pulls);

    let mut succeeded = true;
    for (kind, outcome) in [("issues", issues), ("pull requests", pulls)] {
        if let Some(Err(e)) = outcome {
            tracing::error!("Failed to fetch {}: {}", kind, e);
            succeeded = false;
        }
    }

    Ok(succeeded)
}
