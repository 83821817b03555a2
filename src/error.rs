use std::path::PathBuf;

/// Everything that can stop a snapshot run.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// A setting is missing or malformed. Raised before any network call.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// GitHub rejected the credential.
    #[error("GitHub rejected the credential: {0}")]
    Authentication(String),

    /// The repository identifier does not resolve.
    #[error("repository {0} not found")]
    NotFound(String),

    /// Any other failure talking to the API, including mid-pagination.
    #[error("network error while {operation}: {source}")]
    Network {
        operation: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode records: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<envy::Error> for FetchError {
    fn from(err: envy::Error) -> Self {
        FetchError::Config(err.to_string())
    }
}

impl FetchError {
    pub(crate) fn network(
        operation: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        FetchError::Network {
            operation,
            source: source.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FetchError::Io {
            path: path.into(),
            source,
        }
    }
}
