pub mod delivery;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod persist;
pub mod pipeline;
mod retry;
pub mod urls;

pub use delivery::parse_delivery;
pub use error::{ExtractError, FetchError, PersistError, PipelineError};
pub use extract::{extract, extract_listings, CompiledSelectors, Extraction, ItemSkip};
pub use fetch::{Fetcher, RawPage};
pub use persist::{save_listings, CSV_COLUMNS};
pub use pipeline::{
    run, scrape_and_save, AggregatedResult, PipelineOptions, RunReport, SourceFailure,
    SourceOutcome, SourceStatus,
};
pub use urls::{build_search_url, resolve_url};
