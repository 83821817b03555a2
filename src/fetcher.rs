use crate::error::FetchError;
use crate::github::IssueTracker;
use crate::output;
use crate::types::{self, Window};
use serde_json::Value;
use std::path::Path;

/// Snapshots the plain issues created inside `window` into `output`.
///
/// Issues are requested with `since = window.start`; GitHub applies `since`
/// to the update time, so the creation time is still checked on both ends.
/// Pull requests returned by the issues listing are dropped. At most
/// `max_records` issues are kept and no page is requested once that many
/// have been collected.
///
/// Returns the number of issues written. On error nothing is written.
pub async fn fetch_issues<T>(
    tracker: &T,
    window: &Window,
    per_page: u8,
    max_records: usize,
    output: &Path,
) -> Result<usize, FetchError>
where
    T: IssueTracker + ?Sized,
{
    tracing::info!("Fetching issues...");

    let mut pager = tracker.issues(window.start, per_page);
    let mut result: Vec<Value> = Vec::new();
    let mut pages = 0usize;

    'pages: while result.len() < max_records {
        let Some(page) = pager.next_page().await? else {
            break;
        };
        pages += 1;

        for issue in page {
            if types::is_pull_request(&issue) || !created_within(&issue, window) {
                continue;
            }
            result.push(issue);
            if result.len() >= max_records {
                tracing::debug!(max_records, "Reached the issue cap");
                break 'pages;
            }
        }
    }

    tracing::debug!(pages, "Finished scanning issues");
    output::write_records(output, &result).await?;
    tracing::info!("Saved {} issues.", result.len());

    Ok(result.len())
}

/// Snapshots the pull requests created inside `window` into `output`.
///
/// The listing is sorted by creation time, newest first, but every page is
/// still scanned rather than stopping once records fall before the window.
///
/// Returns the number of pull requests written. On error nothing is written.
pub async fn fetch_pull_requests<T>(
    tracker: &T,
    window: &Window,
    per_page: u8,
    output: &Path,
) -> Result<usize, FetchError>
where
    T: IssueTracker + ?Sized,
{
    tracing::info!("Fetching PRs...");

    let mut pager = tracker.pull_requests(per_page);
    let mut result: Vec<Value> = Vec::new();
    let mut pages = 0usize;

    while let Some(page) = pager.next_page().await? {
        pages += 1;
        result.extend(page.into_iter().filter(|pr| created_within(pr, window)));
    }

    tracing::debug!(pages, "Finished scanning pull requests");
    output::write_records(output, &result).await?;
    tracing::info!("Saved {} PRs.", result.len());

    Ok(result.len())
}

fn created_within(record: &Value, window: &Window) -> bool {
    match types::created_at(record) {
        Some(at) => window.contains(at),
        None => {
            let id = record.get("id").and_then(Value::as_u64);
            tracing::warn!(id, "Skipping record without a readable created_at");
            false
        }
    }
}
