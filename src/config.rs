//! Application configuration and environment variable parsing.
//!
//! Settings are read from the process environment (optionally seeded from a
//! `.env` file). `AppConfig` holds the credential, the repository to snapshot,
//! the creation-date window and where the output and log files go.

use crate::error::FetchError;
use crate::types::{self, Window};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

/// A unique identifier for a GitHub repository.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    /// The owner of the repository (e.g., "facebook").
    pub owner: String,
    /// The name of the repository (e.g., "react").
    pub repo: String,
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl std::str::FromStr for RepoId {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('/').map(str::trim).collect();
        match parts.as_slice() {
            [owner, repo] if !owner.is_empty() && !repo.is_empty() => Ok(RepoId {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
            _ => Err(FetchError::Config(format!(
                "REPO_NAME must look like owner/name, got {s:?}"
            ))),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    /// GitHub Personal Access Token used as the bearer credential.
    pub github_token: String,

    /// Repository to snapshot, as "owner/name".
    #[serde(deserialize_with = "deserialize_repo_id")]
    pub repo_name: RepoId,

    /// Earliest creation time kept (inclusive).
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub start_date: DateTime<Utc>,

    /// Latest creation time kept (inclusive).
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub end_date: DateTime<Utc>,

    /// Page size requested from the GitHub API. GitHub caps this at 100.
    #[serde(default = "default_per_page")]
    pub per_page: u8,

    /// Together with `per_page`, bounds how many issues are kept.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Snapshot directory. Created before the fetches start, and holds the
    /// output files unless `issue_data_file`/`pr_data_file` point elsewhere.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Defaults to `issues.json` inside `data_dir`.
    pub issue_data_file: Option<PathBuf>,

    /// Defaults to `pull_requests.json` inside `data_dir`.
    pub pr_data_file: Option<PathBuf>,

    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_per_page() -> u8 {
    100
}

fn default_max_pages() -> u32 {
    10
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("logs/gh_snapshot.log")
}

fn default_log_level() -> String {
    "INFO".to_string()
}

impl AppConfig {
    /// Loads and validates the configuration from the environment.
    pub fn from_env() -> Result<Self, FetchError> {
        let config: Self = envy::from_env()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), FetchError> {
        if self.github_token.trim().is_empty() {
            return Err(FetchError::Config("GITHUB_TOKEN is empty".to_string()));
        }
        if !(1..=100).contains(&self.per_page) {
            return Err(FetchError::Config(format!(
                "PER_PAGE must be between 1 and 100, got {}",
                self.per_page
            )));
        }
        if self.start_date > self.end_date {
            return Err(FetchError::Config(format!(
                "START_DATE {} is after END_DATE {}",
                self.start_date, self.end_date
            )));
        }
        self.log_filter()?;
        Ok(())
    }

    pub fn window(&self) -> Window {
        Window {
            start: self.start_date,
            end: self.end_date,
        }
    }

    /// Hard cap on the number of issues written. This bounds memory and API
    /// usage; it is not tied to where GitHub's pages actually break.
    pub fn max_records(&self) -> usize {
        usize::from(self.per_page).saturating_mul(self.max_pages as usize)
    }

    pub fn issue_output_path(&self) -> PathBuf {
        self.issue_data_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("issues.json"))
    }

    pub fn pr_output_path(&self) -> PathBuf {
        self.pr_data_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("pull_requests.json"))
    }

    /// Maps `LOG_LEVEL` to a tracing filter. The logging-module names
    /// `WARNING` and `CRITICAL` are accepted alongside tracing's own.
    pub fn log_filter(&self) -> Result<LevelFilter, FetchError> {
        match self.log_level.trim().to_ascii_uppercase().as_str() {
            "TRACE" => Ok(LevelFilter::TRACE),
            "DEBUG" => Ok(LevelFilter::DEBUG),
            "INFO" => Ok(LevelFilter::INFO),
            "WARN" | "WARNING" => Ok(LevelFilter::WARN),
            "ERROR" | "CRITICAL" => Ok(LevelFilter::ERROR),
            "OFF" => Ok(LevelFilter::OFF),
            other => Err(FetchError::Config(format!("unknown LOG_LEVEL {other:?}"))),
        }
    }
}

fn deserialize_repo_id<'de, D>(deserializer: D) -> Result<RepoId, D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    types::parse_timestamp(&s)
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognised timestamp {s:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serial_test::serial;
    use std::env;

    const VARS: [&str; 11] = [
        "GITHUB_TOKEN",
        "REPO_NAME",
        "START_DATE",
        "END_DATE",
        "PER_PAGE",
        "MAX_PAGES",
        "DATA_DIR",
        "ISSUE_DATA_FILE",
        "PR_DATA_FILE",
        "LOG_FILE",
        "LOG_LEVEL",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    fn set_required() {
        env::set_var("GITHUB_TOKEN", "ghp_test");
        env::set_var("REPO_NAME", "rust-lang/rust");
        env::set_var("START_DATE", "2023-01-01T00:00:00");
        env::set_var("END_DATE", "2023-01-31T23:59:59");
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        clear_env();
        set_required();
        env::set_var("PER_PAGE", "50");
        env::set_var("MAX_PAGES", "2");
        env::set_var("DATA_DIR", "out");
        env::set_var("ISSUE_DATA_FILE", "out/my_issues.json");
        env::set_var("LOG_FILE", "var/run.log");
        env::set_var("LOG_LEVEL", "warning");

        let config = AppConfig::from_env().expect("Failed to load config");

        assert_eq!(config.github_token, "ghp_test");
        assert_eq!(config.repo_name.owner, "rust-lang");
        assert_eq!(config.repo_name.repo, "rust");
        assert_eq!(
            config.window().start,
            Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            config.window().end,
            Utc.with_ymd_and_hms(2023, 1, 31, 23, 59, 59).unwrap()
        );
        assert_eq!(config.max_records(), 100);
        assert_eq!(config.issue_output_path(), PathBuf::from("out/my_issues.json"));
        assert_eq!(config.pr_output_path(), PathBuf::from("out/pull_requests.json"));
        assert_eq!(config.log_file, PathBuf::from("var/run.log"));
        assert_eq!(config.log_filter().unwrap(), LevelFilter::WARN);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_config_defaults() {
        clear_env();
        set_required();

        let config = AppConfig::from_env().expect("Failed to load config");

        assert_eq!(config.per_page, 100);
        assert_eq!(config.max_pages, 10);
        assert_eq!(config.max_records(), 1000);
        assert_eq!(config.issue_output_path(), PathBuf::from("data/issues.json"));
        assert_eq!(config.log_filter().unwrap(), LevelFilter::INFO);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_config_missing_token() {
        clear_env();
        set_required();
        env::remove_var("GITHUB_TOKEN");

        let result = AppConfig::from_env();
        assert!(matches!(result, Err(FetchError::Config(_))));

        env::set_var("GITHUB_TOKEN", "  ");
        let result = AppConfig::from_env();
        assert!(matches!(result, Err(FetchError::Config(_))));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_config_missing_repo() {
        clear_env();
        set_required();
        env::remove_var("REPO_NAME");

        assert!(matches!(AppConfig::from_env(), Err(FetchError::Config(_))));

        env::set_var("REPO_NAME", "just-a-name");
        assert!(matches!(AppConfig::from_env(), Err(FetchError::Config(_))));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_config_rejects_bad_values() {
        clear_env();
        set_required();

        env::set_var("START_DATE", "2023-02-01");
        assert!(matches!(AppConfig::from_env(), Err(FetchError::Config(_))));
        env::set_var("START_DATE", "yesterday");
        assert!(matches!(AppConfig::from_env(), Err(FetchError::Config(_))));
        env::set_var("START_DATE", "2023-01-01");

        env::set_var("PER_PAGE", "0");
        assert!(matches!(AppConfig::from_env(), Err(FetchError::Config(_))));
        env::set_var("PER_PAGE", "101");
        assert!(matches!(AppConfig::from_env(), Err(FetchError::Config(_))));
        env::remove_var("PER_PAGE");

        env::set_var("LOG_LEVEL", "LOUD");
        assert!(matches!(AppConfig::from_env(), Err(FetchError::Config(_))));

        clear_env();
    }

    #[test]
    fn test_parse_repo_id() {
        let id: RepoId = " owner / name ".parse().unwrap();
        assert_eq!(id.to_string(), "owner/name");
        assert!("a/b/c".parse::<RepoId>().is_err());
        assert!("/name".parse::<RepoId>().is_err());
    }
}
