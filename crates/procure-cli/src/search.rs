//! Command handlers for `procure search` and `procure sources`.
//!
//! Source failures are reported in the printed summary, not as an error
//! exit. Only configuration problems and rejected runs propagate.

use std::path::Path;

use procure_core::AppConfig;
use procure_scraper::{Fetcher, PipelineOptions, RunReport, SourceStatus};

/// Run one search across every configured store and print the summary.
///
/// When `output_dir` is `None` nothing is written to disk.
///
/// # Errors
///
/// Returns an error if the source catalog cannot be loaded, the HTTP client
/// cannot be built, or the pipeline rejects the run (blank query, no sources).
pub(crate) async fn run_search(
    config: &AppConfig,
    query: &str,
    sources_path: &Path,
    output_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let catalog = procure_core::load_sources(sources_path)?;
    tracing::info!(
        path = %sources_path.display(),
        sources = catalog.sources.len(),
        "loaded source catalog"
    );
    let fetcher = Fetcher::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?;
    let options = PipelineOptions::from_config(config);

    let report = match output_dir {
        Some(dir) => {
            procure_scraper::scrape_and_save(&fetcher, query, &catalog.sources, &options, dir)
                .await?
        }
        None => procure_scraper::run(&fetcher, query, &catalog.sources, &options).await?,
    };

    print!("{}", render_report(&report));
    Ok(())
}

/// Print the configured stores, one per line.
///
/// # Errors
///
/// Returns an error if the source catalog cannot be loaded or fails
/// validation.
pub(crate) fn list_sources(sources_path: &Path) -> anyhow::Result<()> {
    let catalog = procure_core::load_sources(sources_path)?;
    for source in &catalog.sources {
        println!("{:<16} {}", source.name, source.search_url_template);
    }
    Ok(())
}

/// The full printed summary: query, status paragraph, one line per source,
/// and the saved path when a file was written.
pub(crate) fn render_report(report: &RunReport) -> String {
    let mut out = format!("query: {}\n\n{}\n\n", report.query, report.status_text());
    for line in outcome_lines(report) {
        out.push_str(&line);
        out.push('\n');
    }
    if let Some(path) = &report.result.output_path {
        out.push_str(&format!(
            "\nsaved {} listings to {}\n",
            report.total_listings(),
            path.display()
        ));
    }
    out
}

/// One summary line per source, in catalog order.
pub(crate) fn outcome_lines(report: &RunReport) -> Vec<String> {
    report
        .outcomes
        .iter()
        .map(|outcome| match &outcome.status {
            SourceStatus::Succeeded {
                listings,
                skipped,
                markup_mismatch,
            } => {
                let mut line = format!("  {:<16} ok      {listings} listings", outcome.source);
                if *skipped > 0 {
                    line.push_str(&format!(", {skipped} skipped"));
                }
                if *markup_mismatch {
                    line.push_str(" (no product markup matched)");
                }
                line
            }
            SourceStatus::Failed(failure) => {
                format!("  {:<16} failed  {failure}", outcome.source)
            }
        })
        .collect()
}
