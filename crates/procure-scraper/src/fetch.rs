//! HTTP fetcher for store search result pages.

use std::time::Duration;

use chrono::{DateTime, Utc};
use procure_core::SourceConfig;
use reqwest::Client;

use crate::error::FetchError;
use crate::retry::retry_with_backoff;
use crate::urls::build_search_url;

/// The unparsed search page for one (source, query) pair.
#[derive(Debug, Clone)]
pub struct RawPage {
    /// Name of the source the page was fetched for.
    pub source: String,
    pub url: String,
    pub status: u16,
    pub body: String,
    pub fetched_at: DateTime<Utc>,
}

/// Fetches search pages with a browser user-agent.
///
/// One `Fetcher` is shared by every source in a run; the underlying
/// `reqwest::Client` pools connections per host.
pub struct Fetcher {
    client: Client,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in seconds for exponential backoff: `backoff_base_secs * 2^attempt`.
    backoff_base_secs: u64,
}

impl Fetcher {
    /// Creates a `Fetcher` with configured timeout, `User-Agent`, and retry policy.
    ///
    /// `max_retries` is the number of additional attempts after a transient
    /// failure (transport error, 429, 5xx). `0` means a single attempt.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Builds a `Fetcher` from the process configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] if the HTTP client cannot be constructed.
    pub fn from_config(config: &procure_core::AppConfig) -> Result<Self, FetchError> {
        Self::new(
            config.scraper_request_timeout_secs,
            &config.scraper_user_agent,
            config.scraper_max_retries,
            config.scraper_retry_backoff_base_secs,
        )
    }

    /// Fetches the search results page for `query` on `source`.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Transport`]: connection failure or timeout.
    /// - [`FetchError::Status`]: any non-2xx response.
    /// - [`FetchError::Unexpected`]: the URL could not be used or the body
    ///   could not be decoded.
    pub async fn fetch(&self, source: &SourceConfig, query: &str) -> Result<RawPage, FetchError> {
        let url = build_search_url(source, query);
        tracing::debug!(source = %source.name, url, "fetching search page");

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .get(&url)
                    .header(
                        reqwest::header::ACCEPT,
                        "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
                    )
                    .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
                    .send()
                    .await
                    .map_err(|e| classify(&url, e))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(FetchError::Status {
                        status: status.as_u16(),
                        url,
                    });
                }

                let body = response.text().await.map_err(|e| classify(&url, e))?;

                Ok(RawPage {
                    source: source.name.clone(),
                    url,
                    status: status.as_u16(),
                    body,
                    fetched_at: Utc::now(),
                })
            }
        })
        .await
    }
}

/// Splits `reqwest` failures into network and unexpected errors.
///
/// Builder errors (unusable URL) and decode errors are not network problems;
/// connection, timeout, and body-read failures are.
fn classify(url: &str, err: reqwest::Error) -> FetchError {
    if err.is_builder() || err.is_decode() {
        FetchError::Unexpected {
            url: url.to_owned(),
            reason: err.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_owned(),
            source: err,
        }
    }
}
