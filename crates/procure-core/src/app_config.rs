use std::path::PathBuf;
use std::time::Duration;

/// Desktop Chrome user-agent sent with every search request. Store search
/// pages reject clients that do not look like a browser.
pub const DEFAULT_BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub sources_path: PathBuf,
    /// Directory the persister writes `procurement_*.csv` files into.
    pub output_dir: PathBuf,
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    pub scraper_max_concurrent_sources: usize,
    /// Additional fetch attempts after a transient failure. `0` disables retry.
    pub scraper_max_retries: u32,
    pub scraper_retry_backoff_base_secs: u64,
    /// Deadline for one source's fetch + extract unit.
    pub scraper_source_deadline_secs: u64,
    /// Deadline for the whole multi-source run.
    pub run_timeout_secs: u64,
}

impl AppConfig {
    #[must_use]
    pub fn source_deadline(&self) -> Duration {
        Duration::from_secs(self.scraper_source_deadline_secs)
    }

    #[must_use]
    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("sources_path", &self.sources_path)
            .field("output_dir", &self.output_dir)
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field("scraper_user_agent", &self.scraper_user_agent)
            .field(
                "scraper_max_concurrent_sources",
                &self.scraper_max_concurrent_sources,
            )
            .field("scraper_max_retries", &self.scraper_max_retries)
            .field(
                "scraper_retry_backoff_base_secs",
                &self.scraper_retry_backoff_base_secs,
            )
            .field(
                "scraper_source_deadline_secs",
                &self.scraper_source_deadline_secs,
            )
            .field("run_timeout_secs", &self.run_timeout_secs)
            .finish()
    }
}
