//! Multi-source search orchestration.
//!
//! Each configured source is an independent fetch → extract unit. Units run
//! concurrently (bounded), but their results are written into index-ordered
//! slots so the merged listings always follow source configuration order.
//! A failing or slow source only costs its own listings.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::stream::{self, StreamExt};
use procure_core::{AppConfig, Listing, SourceConfig};

use crate::error::{FetchError, PipelineError};
use crate::extract::{extract_listings, CompiledSelectors, Extraction};
use crate::fetch::Fetcher;
use crate::persist::save_listings;

/// Concurrency and deadline settings for a run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Upper bound on sources fetched at once.
    pub max_concurrent: usize,
    /// Deadline for one source's fetch + extract.
    pub source_deadline: Duration,
    /// Deadline for the whole run. Sources still pending when it expires
    /// are recorded as [`SourceFailure::Deadline`].
    pub run_timeout: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            source_deadline: Duration::from_secs(45),
            run_timeout: Duration::from_secs(120),
        }
    }
}

impl PipelineOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_concurrent: config.scraper_max_concurrent_sources,
            source_deadline: config.source_deadline(),
            run_timeout: config.run_timeout(),
        }
    }
}

/// Why a source contributed no listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceFailure {
    /// Connection failure, timeout, or non-2xx status.
    Network(String),
    /// Any other failure while fetching.
    Unexpected(String),
    /// The source's selector set is not valid CSS.
    InvalidSelector(String),
    /// The source did not finish before its deadline or the run deadline.
    Deadline(Duration),
}

impl SourceFailure {
    /// `true` for failures that count as network errors, deadlines included.
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, SourceFailure::Network(_) | SourceFailure::Deadline(_))
    }
}

impl std::fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceFailure::Network(reason) => write!(f, "network error: {reason}"),
            SourceFailure::Unexpected(reason) => write!(f, "unexpected error: {reason}"),
            SourceFailure::InvalidSelector(reason) => write!(f, "{reason}"),
            SourceFailure::Deadline(limit) => {
                write!(f, "network error: no response within {}s", limit.as_secs())
            }
        }
    }
}

impl From<FetchError> for SourceFailure {
    fn from(err: FetchError) -> Self {
        if err.is_network() {
            SourceFailure::Network(err.to_string())
        } else {
            SourceFailure::Unexpected(err.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceStatus {
    Succeeded {
        listings: usize,
        /// Product tiles that were found but could not be parsed.
        skipped: usize,
        /// The page fetched fine but no product container matched.
        markup_mismatch: bool,
    },
    Failed(SourceFailure),
}

/// Per-source result summary, in source configuration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOutcome {
    pub source: String,
    pub status: SourceStatus,
}

impl SourceOutcome {
    #[must_use]
    pub fn failure(&self) -> Option<&SourceFailure> {
        match &self.status {
            SourceStatus::Failed(failure) => Some(failure),
            SourceStatus::Succeeded { .. } => None,
        }
    }
}

/// Listings from every source, concatenated in source order.
#[derive(Debug, Clone, Default)]
pub struct AggregatedResult {
    pub listings: Vec<Listing>,
    /// Set only after a non-empty result was persisted.
    pub output_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub query: String,
    pub result: AggregatedResult,
    pub outcomes: Vec<SourceOutcome>,
    /// Set when persisting a non-empty result failed. The listings are still
    /// available in `result`.
    pub persist_error: Option<String>,
}

impl RunReport {
    #[must_use]
    pub fn total_listings(&self) -> usize {
        self.result.listings.len()
    }

    pub fn failed_sources(&self) -> impl Iterator<Item = (&str, &SourceFailure)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.failure().map(|f| (o.source.as_str(), f)))
    }

    /// Sources that fetched successfully but matched no product containers.
    pub fn markup_mismatches(&self) -> impl Iterator<Item = &str> {
        self.outcomes.iter().filter_map(|o| match o.status {
            SourceStatus::Succeeded {
                markup_mismatch: true,
                ..
            } => Some(o.source.as_str()),
            _ => None,
        })
    }

    /// `true` when every source failed outright.
    #[must_use]
    pub fn all_sources_failed(&self) -> bool {
        self.outcomes.iter().all(|o| o.failure().is_some())
    }

    /// One-paragraph status for a conversational caller.
    #[must_use]
    pub fn status_text(&self) -> String {
        let mut text = if self.total_listings() > 0 {
            format!(
                "Successfully scraped {} products. Proceed with analysis.",
                self.total_listings()
            )
        } else if self.all_sources_failed() {
            format!(
                "No products found: all {} sources failed.",
                self.outcomes.len()
            )
        } else {
            "No products found. Please try a different search term.".to_owned()
        };

        let failures: Vec<String> = self
            .failed_sources()
            .map(|(source, failure)| format!("{source} ({failure})"))
            .collect();
        if !failures.is_empty() {
            text.push_str(&format!(" Failed sources: {}.", failures.join("; ")));
        }

        let mismatched: Vec<&str> = self.markup_mismatches().collect();
        if !mismatched.is_empty() {
            text.push_str(&format!(
                " No product markup recognized on: {}.",
                mismatched.join(", ")
            ));
        }

        if let Some(err) = &self.persist_error {
            text.push_str(&format!(" Results were not saved: {err}."));
        }

        text
    }
}

/// Runs fetch + extract for every source and merges the listings.
///
/// Per-source failures are recorded in [`RunReport::outcomes`] and never
/// abort the run. Nothing is persisted; see [`scrape_and_save`].
///
/// # Errors
///
/// - [`PipelineError::NoSources`]: `sources` is empty.
/// - [`PipelineError::EmptyQuery`]: `query` is blank.
pub async fn run(
    fetcher: &Fetcher,
    query: &str,
    sources: &[SourceConfig],
    options: &PipelineOptions,
) -> Result<RunReport, PipelineError> {
    if sources.is_empty() {
        return Err(PipelineError::NoSources);
    }
    let query = query.trim();
    if query.is_empty() {
        return Err(PipelineError::EmptyQuery);
    }

    let concurrency = options.max_concurrent.clamp(1, sources.len());
    tracing::info!(
        query,
        sources = sources.len(),
        concurrency,
        "starting search run"
    );

    let mut slots: Vec<Option<Result<Extraction, SourceFailure>>> =
        (0..sources.len()).map(|_| None).collect();

    let mut units = std::pin::pin!(stream::iter(sources.iter().enumerate())
        .map(|(idx, source)| async move {
            (idx, scrape_source(fetcher, source, query, options.source_deadline).await)
        })
        .buffer_unordered(concurrency));

    let fill = async {
        while let Some((idx, result)) = units.next().await {
            slots[idx] = Some(result);
        }
    };
    if tokio::time::timeout(options.run_timeout, fill).await.is_err() {
        tracing::warn!(
            query,
            timeout_secs = options.run_timeout.as_secs(),
            "run deadline reached; unfinished sources marked as failed"
        );
    }

    let mut listings = Vec::new();
    let mut outcomes = Vec::with_capacity(sources.len());

    for (source, slot) in sources.iter().zip(slots) {
        let result = slot.unwrap_or(Err(SourceFailure::Deadline(options.run_timeout)));
        let status = match result {
            Ok(extraction) => {
                tracing::info!(
                    source = %source.name,
                    count = extraction.listings.len(),
                    skipped = extraction.skipped,
                    "scraped source"
                );
                let status = SourceStatus::Succeeded {
                    listings: extraction.listings.len(),
                    skipped: extraction.skipped,
                    markup_mismatch: extraction.markup_mismatch(),
                };
                listings.extend(extraction.listings);
                status
            }
            Err(failure) => {
                tracing::warn!(source = %source.name, error = %failure, "source failed");
                SourceStatus::Failed(failure)
            }
        };
        outcomes.push(SourceOutcome {
            source: source.name.clone(),
            status,
        });
    }

    tracing::info!(query, total = listings.len(), "search run complete");

    Ok(RunReport {
        query: query.to_owned(),
        result: AggregatedResult {
            listings,
            output_path: None,
        },
        outcomes,
        persist_error: None,
    })
}

/// [`run`], then persist the merged listings to `output_dir` when non-empty.
///
/// A persistence failure is logged and recorded on the report; the listings
/// are still returned.
///
/// # Errors
///
/// Same as [`run`].
pub async fn scrape_and_save(
    fetcher: &Fetcher,
    query: &str,
    sources: &[SourceConfig],
    options: &PipelineOptions,
    output_dir: &Path,
) -> Result<RunReport, PipelineError> {
    let mut report = run(fetcher, query, sources, options).await?;

    match save_listings(&report.result.listings, output_dir) {
        Ok(path) => report.result.output_path = path,
        Err(e) => {
            tracing::warn!(output_dir = %output_dir.display(), error = %e, "failed to persist listings");
            report.persist_error = Some(e.to_string());
        }
    }

    Ok(report)
}

async fn scrape_source(
    fetcher: &Fetcher,
    source: &SourceConfig,
    query: &str,
    deadline: Duration,
) -> Result<Extraction, SourceFailure> {
    let selectors = CompiledSelectors::compile(&source.selectors)
        .map_err(|e| SourceFailure::InvalidSelector(e.to_string()))?;

    let page = tokio::time::timeout(deadline, fetcher.fetch(source, query))
        .await
        .map_err(|_| SourceFailure::Deadline(deadline))??;

    Ok(extract_listings(&page, source, &selectors))
}
