use std::path::PathBuf;

use thiserror::Error;

/// Failure fetching one source's search page.
///
/// [`FetchError::Transport`] and [`FetchError::Status`] are network failures;
/// everything else is unexpected. Both are terminal for the source.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("network error fetching {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("unexpected error fetching {url}: {reason}")]
    Unexpected { url: String, reason: String },
}

impl FetchError {
    /// `true` for connection, timeout, and non-2xx failures.
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, FetchError::Transport { .. } | FetchError::Status { .. })
    }

    /// Returns `true` if retrying the same request may succeed.
    ///
    /// Transport failures, 429, and 5xx are retriable. Other 4xx statuses and
    /// unexpected failures would fail the same way again.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        match self {
            FetchError::Transport { .. } => true,
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            FetchError::Client(_) | FetchError::Unexpected { .. } => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid {field} selector \"{selector}\": {reason}")]
    InvalidSelector {
        field: &'static str,
        selector: String,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to create output directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),
}

/// Run-level failures. Per-source problems never surface here; they are
/// recorded on the report's source outcomes instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no sources configured")]
    NoSources,

    #[error("search query is empty")]
    EmptyQuery,
}
